use crate::model::{IntOrString, RollingUpdate, WarmPoolSpec};

/// A type that can be merged with itself.
///
/// Used for settings that can be given at cluster level and overridden per
/// instance group, where the tighter scope takes precedence.
///
/// # Example
///
/// ```
/// # use kops_api::{merge::merge, model::{IntOrString, RollingUpdate}};
/// let merged = merge(
///     RollingUpdate {
///         max_surge: Some(IntOrString::Int(1)),
///         ..RollingUpdate::default()
///     },
///     &RollingUpdate {
///         max_surge: Some(IntOrString::Int(3)),
///         drain_and_terminate: Some(true),
///         ..RollingUpdate::default()
///     },
/// );
/// assert_eq!(merged.max_surge, Some(IntOrString::Int(1)));
/// assert_eq!(merged.drain_and_terminate, Some(true));
/// ```
pub trait Merge {
    /// Merge with `defaults`, preferring values from `self` if they are set there
    fn merge(&mut self, defaults: &Self);
}

/// Moving version of [`Merge::merge`]
pub fn merge<T: Merge>(mut overrides: T, defaults: &T) -> T {
    overrides.merge(defaults);
    overrides
}

/// A marker trait for types that are merged as one single value rather than
/// field by field
pub trait Atomic: Clone {}
impl Atomic for i64 {}
impl Atomic for bool {}
impl Atomic for IntOrString {}

impl<T: Atomic> Merge for Option<T> {
    fn merge(&mut self, defaults: &Self) {
        if self.is_none() {
            *self = defaults.clone();
        }
    }
}

/// `minSize` and `enableLifecycleHook` are plain values, so their zero
/// value counts as unset.
impl Merge for WarmPoolSpec {
    fn merge(&mut self, defaults: &Self) {
        if self.min_size == 0 {
            self.min_size = defaults.min_size;
        }
        self.max_size.merge(&defaults.max_size);
        if !self.enable_lifecycle_hook {
            self.enable_lifecycle_hook = defaults.enable_lifecycle_hook;
        }
    }
}

impl Merge for RollingUpdate {
    fn merge(&mut self, defaults: &Self) {
        self.drain_and_terminate.merge(&defaults.drain_and_terminate);
        self.max_unavailable.merge(&defaults.max_unavailable);
        self.max_surge.merge(&defaults.max_surge);
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(None, None, None)]
    #[case(Some(1), None, Some(1))]
    #[case(None, Some(2), Some(2))]
    #[case(Some(1), Some(2), Some(1))]
    fn merge_option(#[case] value: Option<i64>, #[case] defaults: Option<i64>, #[case] expected: Option<i64>) {
        assert_eq!(merge(value, &defaults), expected);
    }

    #[test]
    fn merge_warm_pool_fills_zero_values() {
        let merged = merge(
            WarmPoolSpec {
                min_size: 0,
                max_size: Some(7),
                enable_lifecycle_hook: false,
            },
            &WarmPoolSpec {
                min_size: 5,
                max_size: None,
                enable_lifecycle_hook: true,
            },
        );
        assert_eq!(merged, WarmPoolSpec {
            min_size: 5,
            max_size: Some(7),
            enable_lifecycle_hook: true,
        });
    }

    #[test]
    fn merge_rolling_update_per_field() {
        let merged = merge(
            RollingUpdate {
                max_unavailable: Some(IntOrString::String("25%".to_owned())),
                ..RollingUpdate::default()
            },
            &RollingUpdate {
                drain_and_terminate: Some(false),
                max_unavailable: Some(IntOrString::Int(1)),
                max_surge: Some(IntOrString::Int(2)),
            },
        );
        assert_eq!(merged, RollingUpdate {
            drain_and_terminate: Some(false),
            max_unavailable: Some(IntOrString::String("25%".to_owned())),
            max_surge: Some(IntOrString::Int(2)),
        });
    }
}
