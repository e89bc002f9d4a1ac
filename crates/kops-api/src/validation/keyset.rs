use std::collections::HashSet;

use crate::{
    model::{KEYSET_TYPE_KEYPAIR, Keyset, SUPPORTED_KEYSET_TYPES},
    validation::{ErrorList, FieldError, Path, primitives::is_valid_value},
};

/// Validates a keyset. The key material itself is not inspected.
pub fn validate_keyset(keyset: &Keyset) -> ErrorList {
    let mut errors = ErrorList::new();
    let spec = &keyset.spec;
    let spec_path = Path::new("spec");

    if keyset.metadata.name.is_empty() {
        errors.push(FieldError::required(
            &Path::new("metadata").child("name"),
            "Keyset name is required",
        ));
    }

    let type_path = spec_path.child("type");
    match spec.keyset_type.as_deref() {
        None | Some("") => errors.push(FieldError::required(&type_path, "Keyset type is required")),
        keyset_type => errors.extend(is_valid_value(&type_path, keyset_type, SUPPORTED_KEYSET_TYPES)),
    }

    let keys_path = spec_path.child("keys");
    let mut ids = HashSet::new();
    for (i, item) in spec.keys.iter().enumerate() {
        let item_path = keys_path.index(i);

        if item.id.is_empty() {
            errors.push(FieldError::required(&item_path.child("id"), "key id is required"));
        } else if !ids.insert(item.id.as_str()) {
            errors.push(FieldError::duplicate(&item_path.child("id"), item.id.as_str()));
        }

        if spec.keyset_type.as_deref() == Some(KEYSET_TYPE_KEYPAIR)
            && item.public_material.as_deref().is_none_or(<[u8]>::is_empty)
        {
            errors.push(FieldError::required(
                &item_path.child("publicMaterial"),
                "Keypair items must carry a certificate",
            ));
        }
    }

    if let Some(primary_id) = spec.primary_id.as_deref() {
        if !ids.contains(primary_id) {
            errors.push(FieldError::not_found(
                &spec_path.child("primaryID"),
                primary_id,
                format!("primaryID {primary_id:?} does not name a key of this keyset"),
            ));
        }
    }

    errors
}
