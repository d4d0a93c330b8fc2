//! Macros for reducing boilerplate when declaring DTO schemas

/// Declare a DTO schema and its [`DtoSchema`](crate::core::dto::DtoSchema) impl
///
/// Every section is optional but they must appear in this order:
/// `whitelist`, `strip_nulls`, `defaults`, `rules`, `filters`, `transform`.
/// Keys are identifiers or string literals (for dotted paths).
///
/// # Example
///
/// ```
/// use dto::prelude::*;
/// use serde_json::json;
///
/// dto_schema! {
///     /// Payload for creating an invoice
///     pub struct InvoiceSchema => CreateInvoice {
///         whitelist: true,
///         defaults: { "currency": "EUR" },
///         rules: {
///             number: [required, string, between(3, 50)],
///             amount: [required, numeric, min(0)],
///             currency: [required, in_list("EUR", "USD")],
///             "customer.email": [nullable, email],
///             customer: [nullable, array],
///         },
///         filters: {
///             number: [trim, uppercase],
///             amount: [round_decimals(2)],
///         },
///     }
/// }
///
/// let invoice = CreateInvoice::from_json(
///     r#"{"number": " inv-001 ", "amount": 10.456, "note": "dropped"}"#,
/// ).unwrap();
///
/// assert_eq!(invoice.get("number"), Some(&json!("INV-001")));
/// assert_eq!(invoice.get("amount"), Some(&json!(10.46)));
/// assert_eq!(invoice.get("currency"), Some(&json!("EUR")));
/// assert!(!invoice.has("note"));
/// ```
#[macro_export]
macro_rules! dto_schema {
    (
        $(#[$meta:meta])*
        $vis:vis struct $schema:ident $( => $alias:ident )? {
            $( whitelist: $whitelist:expr, )?
            $( strip_nulls: $strip:expr, )?
            $( defaults: $defaults:tt, )?
            $( rules: { $( $rkey:tt : [ $( $rule:tt )* ] ),* $(,)? }, )?
            $( filters: { $( $fkey:tt : [ $( $filter:tt )* ] ),* $(,)? }, )?
            $( transform: $transform:expr $(,)? )?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $schema;

        impl $crate::core::dto::DtoSchema for $schema {
            const NAME: &'static str = stringify!($schema);
            $( const WHITELIST: bool = $whitelist; )?
            $( const STRIP_NULLS: bool = $strip; )?

            $(
                fn defaults() -> $crate::core::fields::Fields {
                    match $crate::__private::serde_json::json!($defaults) {
                        $crate::__private::serde_json::Value::Object(map) => map,
                        _ => $crate::core::fields::Fields::new(),
                    }
                }
            )?

            $(
                fn rules() -> $crate::core::validation::Rules {
                    $crate::core::validation::Rules::new()
                    $(
                        .field(
                            $crate::__dto_key!($rkey),
                            $crate::__dto_rule_set!(@acc [] $( $rule )*),
                        )
                    )*
                }
            )?

            $(
                fn filters() -> ::std::vec::Vec<(::std::string::String, $crate::core::validation::Filter)> {
                    #[allow(unused_mut)]
                    let mut filters = ::std::vec::Vec::new();
                    $(
                        $crate::__dto_filters!(filters, $crate::__dto_key!($fkey); $( $filter )*);
                    )*
                    filters
                }
            )?

            $(
                fn transform(fields: &$crate::core::fields::Fields) -> $crate::core::fields::Fields {
                    let transform: fn(&$crate::core::fields::Fields) -> $crate::core::fields::Fields =
                        $transform;
                    transform(fields)
                }
            )?
        }

        $( $vis type $alias = $crate::core::dto::Dto<$schema>; )?
    };
}

/// Helper macro turning a schema key (identifier or literal) into a `&str`
#[doc(hidden)]
#[macro_export]
macro_rules! __dto_key {
    ($key:ident) => {
        stringify!($key)
    };
    ($key:literal) => {
        $key
    };
}

/// Helper macro to build a rule-set from rule identifiers
#[doc(hidden)]
#[macro_export]
macro_rules! __dto_rule_set {
    // Base case: everything consumed
    (@acc [ $( $acc:expr ),* ]) => {
        $crate::core::validation::RuleSet::from(::std::vec![ $( $acc ),* ])
    };

    // Separators
    (@acc [ $( $acc:expr ),* ] , $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@acc [ $( $acc ),* ] $( $rest )*)
    };

    (@push [ $( $acc:expr ),* ] $rule:expr; $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@acc [ $( $acc, )* $rule ] $( $rest )*)
    };

    // Parameterless rules
    (@acc [ $( $acc:expr ),* ] required $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::Required; $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] nullable $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::Nullable; $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] bail $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::Bail; $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] string $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::String; $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] integer $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::Integer; $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] numeric $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::Numeric; $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] boolean $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::Boolean; $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] array $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::Array; $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] email $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::Email; $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] url $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::Url; $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] uuid $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::Uuid; $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] confirmed $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::Confirmed; $( $rest )*)
    };

    // Rules with parameters
    (@acc [ $( $acc:expr ),* ] min($n:expr) $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::Min(($n) as f64); $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] max($n:expr) $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::Max(($n) as f64); $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] size($n:expr) $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::Size(($n) as f64); $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] between($min:expr, $max:expr) $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::Between(($min) as f64, ($max) as f64); $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] regex($pattern:expr) $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::regex($pattern); $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] in_list($( $value:expr ),* $(,)?) $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::In(::std::vec![ $( ($value).to_string() ),* ]); $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] not_in($( $value:expr ),* $(,)?) $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::NotIn(::std::vec![ $( ($value).to_string() ),* ]); $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] date_format($format:expr) $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::DateFormat(($format).to_string()); $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] same($other:expr) $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::Same(($other).to_string()); $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] different($other:expr) $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::Different(($other).to_string()); $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] required_with($other:expr) $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::RequiredWith(($other).to_string()); $( $rest )*)
    };
    (@acc [ $( $acc:expr ),* ] required_without($other:expr) $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $crate::core::validation::Rule::RequiredWithout(($other).to_string()); $( $rest )*)
    };

    // Any other Rule value
    (@acc [ $( $acc:expr ),* ] rule($rule:expr) $( $rest:tt )*) => {
        $crate::__dto_rule_set!(@push [ $( $acc ),* ] $rule; $( $rest )*)
    };
}

/// Helper macro to push filters for a key
#[doc(hidden)]
#[macro_export]
macro_rules! __dto_filters {
    // Base case: empty
    ($vec:ident, $key:expr;) => {};

    // Separators
    ($vec:ident, $key:expr; , $( $rest:tt )*) => {
        $crate::__dto_filters!($vec, $key; $( $rest )*);
    };

    // trim
    ($vec:ident, $key:expr; trim $( $rest:tt )*) => {
        $vec.push((($key).to_string(), $crate::core::validation::filters::shared($crate::core::validation::filters::trim())));
        $crate::__dto_filters!($vec, $key; $( $rest )*);
    };

    // uppercase
    ($vec:ident, $key:expr; uppercase $( $rest:tt )*) => {
        $vec.push((($key).to_string(), $crate::core::validation::filters::shared($crate::core::validation::filters::uppercase())));
        $crate::__dto_filters!($vec, $key; $( $rest )*);
    };

    // lowercase
    ($vec:ident, $key:expr; lowercase $( $rest:tt )*) => {
        $vec.push((($key).to_string(), $crate::core::validation::filters::shared($crate::core::validation::filters::lowercase())));
        $crate::__dto_filters!($vec, $key; $( $rest )*);
    };

    // null_if_empty
    ($vec:ident, $key:expr; null_if_empty $( $rest:tt )*) => {
        $vec.push((($key).to_string(), $crate::core::validation::filters::shared($crate::core::validation::filters::null_if_empty())));
        $crate::__dto_filters!($vec, $key; $( $rest )*);
    };

    // round_decimals with parameter
    ($vec:ident, $key:expr; round_decimals($decimals:expr) $( $rest:tt )*) => {
        $vec.push((($key).to_string(), $crate::core::validation::filters::shared($crate::core::validation::filters::round_decimals($decimals))));
        $crate::__dto_filters!($vec, $key; $( $rest )*);
    };

    // Any other filter closure
    ($vec:ident, $key:expr; filter($filter:expr) $( $rest:tt )*) => {
        $vec.push((($key).to_string(), $crate::core::validation::filters::shared($filter)));
        $crate::__dto_filters!($vec, $key; $( $rest )*);
    };
}
