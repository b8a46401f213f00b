//! Compile-time field description used to generate default columns.

use std::rc::Rc;

use log::trace;

use crate::spec::{EnumCellValue, SpecColumnHooks, SpecXlsxColumn};
use crate::util::humanize_header;

/// One public field of a record type.
pub struct SpecFieldDescriptor<T> {
    /// Field name as declared.
    pub name: &'static str,
    /// Reads the field from a row.
    pub read: fn(&T) -> EnumCellValue,
}

impl<T> SpecFieldDescriptor<T> {
    pub fn new(name: &'static str, read: fn(&T) -> EnumCellValue) -> Self {
        Self { name, read }
    }
}

/// Record types whose public fields can be listed without an instance.
///
/// Usually implemented through [`describable!`](crate::describable).
pub trait Describable: Sized + 'static {
    /// Public fields in declaration order.
    fn describe_fields() -> Vec<SpecFieldDescriptor<Self>>;
}

/// Build one column per public field of `T`.
///
/// Headers are humanized field names; every column auto-fits its width.
pub fn auto_generate_columns<T: Describable>() -> Vec<SpecXlsxColumn<T>> {
    T::describe_fields()
        .into_iter()
        .map(|field| {
            let header = humanize_header(field.name);
            trace!("auto column {:?} -> header {:?}", field.name, header);
            let read = field.read;
            SpecXlsxColumn {
                extract: Rc::new(move |row: &T| Ok(read(row))),
                header,
                hooks: SpecColumnHooks::new().with_configure_column(|column| column.autofit()),
            }
        })
        .collect()
}

/// Declare a struct and derive [`Describable`] for it.
///
/// Fields declared with a visibility modifier are described in declaration
/// order; private fields are skipped. Field types must be `Clone` and convert
/// into [`EnumCellValue`].
///
/// ```
/// toxlsx::describable! {
///     #[derive(Debug, Clone)]
///     pub struct Person {
///         pub name: String,
///         pub age: u32,
///         secret: String,
///     }
/// }
///
/// use toxlsx::Describable;
/// let l_names: Vec<_> = Person::describe_fields().iter().map(|f| f.name).collect();
/// assert_eq!(l_names, ["name", "age"]);
/// ```
#[macro_export]
macro_rules! describable {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field : $ty,
            )*
        }

        impl $crate::Describable for $name {
            fn describe_fields() -> ::std::vec::Vec<$crate::SpecFieldDescriptor<Self>> {
                let mut l_fields = ::std::vec::Vec::new();
                $(
                    if !stringify!($field_vis).is_empty() {
                        l_fields.push($crate::SpecFieldDescriptor::new(
                            stringify!($field),
                            |row: &Self| {
                                $crate::EnumCellValue::from(::std::clone::Clone::clone(&row.$field))
                            },
                        ));
                    }
                )*
                l_fields
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::XlsxColumnRange;

    crate::describable! {
        #[derive(Debug, Clone)]
        #[allow(non_snake_case)]
        pub struct Order {
            pub orderId: i64,
            pub customerName: String,
            internal_note: String,
            pub(crate) shipped: bool,
            pub total: Option<f64>,
        }
    }

    fn sample_order() -> Order {
        Order {
            orderId: 7,
            customerName: "Bo".to_string(),
            internal_note: "hidden".to_string(),
            shipped: true,
            total: None,
        }
    }

    #[test]
    fn test_describe_fields_skips_private_fields() {
        let l_names: Vec<_> = Order::describe_fields().iter().map(|f| f.name).collect();
        assert_eq!(l_names, ["orderId", "customerName", "shipped", "total"]);
        assert_eq!(sample_order().internal_note, "hidden");
    }

    #[test]
    fn test_auto_generate_columns_humanizes_and_extracts() {
        let l_columns = auto_generate_columns::<Order>();
        let l_headers: Vec<_> = l_columns.iter().map(|c| c.header.as_str()).collect();
        assert_eq!(l_headers, ["order Id", "customer Name", "shipped", "total"]);

        let order = sample_order();
        let l_values: Vec<_> = l_columns
            .iter()
            .map(|c| (c.extract)(&order).unwrap())
            .collect();
        assert_eq!(
            l_values,
            vec![
                EnumCellValue::Number(7.0),
                EnumCellValue::String("Bo".to_string()),
                EnumCellValue::Boolean(true),
                EnumCellValue::None,
            ]
        );
    }

    #[test]
    fn test_auto_generated_columns_autofit() {
        for column in auto_generate_columns::<Order>() {
            let hook = column.hooks.configure_column.expect("autofit hook");
            let mut range = XlsxColumnRange::new(0);
            hook(&mut range);
            assert!(range.is_autofit());
        }
    }
}
