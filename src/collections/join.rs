// ============================================================================
// spark-observables - Join Coercion
// How items render inside `ObservableCollection::join`
// ============================================================================

use std::fmt::Write;
use std::rc::Rc;

/// Renders an item for `join`.
///
/// Absent values (`None`) render as the empty string, everything else
/// through its `Display` form.
pub trait JoinItem {
    fn write_join(&self, out: &mut String);
}

macro_rules! display_join_item {
    ($($ty:ty),* $(,)?) => {
        $(
            impl JoinItem for $ty {
                fn write_join(&self, out: &mut String) {
                    // Writing into a String cannot fail
                    let _ = write!(out, "{self}");
                }
            }
        )*
    };
}

display_join_item!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, str,
    String,
);

impl<T: JoinItem> JoinItem for Option<T> {
    fn write_join(&self, out: &mut String) {
        if let Some(item) = self {
            item.write_join(out);
        }
    }
}

impl<T: JoinItem + ?Sized> JoinItem for &T {
    fn write_join(&self, out: &mut String) {
        (**self).write_join(out);
    }
}

impl<T: JoinItem + ?Sized> JoinItem for Box<T> {
    fn write_join(&self, out: &mut String) {
        (**self).write_join(out);
    }
}

impl<T: JoinItem + ?Sized> JoinItem for Rc<T> {
    fn write_join(&self, out: &mut String) {
        (**self).write_join(out);
    }
}

/// Join `items` with `separator`.
pub(crate) fn join_items<T: JoinItem>(items: &[T], separator: &str) -> String {
    let mut out = String::new();
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push_str(separator);
        }
        item.write_join(&mut out);
    }
    out
}
