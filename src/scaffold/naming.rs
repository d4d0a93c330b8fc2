//! Class-name handling for generated DTOs

use super::ScaffoldError;
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Utility for converting identifiers between naming conventions
pub struct Casing;

impl Casing {
    /// Convert to StudlyCase
    ///
    /// `_`, `-` and spaces separate words; the first letter of every word is
    /// uppercased and the rest is kept as written.
    ///
    /// # Examples
    ///
    /// ```
    /// use dto::scaffold::naming::Casing;
    ///
    /// assert_eq!(Casing::studly("user_profile"), "UserProfile");
    /// assert_eq!(Casing::studly("order-line"), "OrderLine");
    /// assert_eq!(Casing::studly("createUser"), "CreateUser");
    /// ```
    pub fn studly(input: &str) -> String {
        input
            .split(['_', '-', ' '])
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect()
    }

    /// Convert to snake_case
    ///
    /// Acronyms stay together (`HTTPClient` → `http_client`).
    ///
    /// # Examples
    ///
    /// ```
    /// use dto::scaffold::naming::Casing;
    ///
    /// assert_eq!(Casing::snake("UserProfile"), "user_profile");
    /// assert_eq!(Casing::snake("HTTPClient"), "http_client");
    /// assert_eq!(Casing::snake("already_snake"), "already_snake");
    /// ```
    pub fn snake(input: &str) -> String {
        let chars: Vec<char> = input.chars().collect();
        let mut out = String::with_capacity(input.len() + 4);

        for (i, &c) in chars.iter().enumerate() {
            if c == '-' || c == ' ' {
                if !out.ends_with('_') {
                    out.push('_');
                }
                continue;
            }

            if c.is_uppercase() && i > 0 {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                let boundary = prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next_is_lower);
                if boundary && !out.ends_with('_') {
                    out.push('_');
                }
            }

            out.extend(c.to_lowercase());
        }

        out
    }
}

/// A validated DTO name as given on the command line (`Admin/UserProfile`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DtoName {
    raw: String,
    class: String,
    directories: Vec<String>,
}

impl DtoName {
    /// Validate and split a name
    ///
    /// Only letters, digits, underscores and forward slashes are accepted,
    /// and the name must not start with a digit or a slash.
    pub fn parse(raw: &str) -> Result<Self, ScaffoldError> {
        static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = NAME_REGEX.get_or_init(|| {
            Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_/]*$").expect("name pattern is a valid regex")
        });

        let invalid = || ScaffoldError::InvalidName {
            name: raw.to_string(),
        };

        if !regex.is_match(raw) {
            return Err(invalid());
        }

        let mut segments: Vec<&str> = raw.split('/').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(invalid());
        }

        let class = Casing::studly(segments.pop().ok_or_else(invalid)?);
        if class.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            raw: raw.to_string(),
            class,
            directories: segments.into_iter().map(Casing::snake).collect(),
        })
    }

    /// The name as given
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// StudlyCase type name (`UserProfile`)
    pub fn class(&self) -> &str {
        &self.class
    }

    /// snake_case module name of the generated file (`user_profile`)
    pub fn module(&self) -> String {
        Casing::snake(&self.class)
    }

    /// snake_case parent directories (`["admin"]`)
    pub fn directories(&self) -> &[String] {
        &self.directories
    }

    /// Module path of the generated file below `root` (`dto::admin::user_profile`)
    pub fn namespace(&self, root: &str) -> String {
        let root = root.trim_matches(':');
        root.split("::")
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .chain(self.directories.iter().cloned())
            .chain(std::iter::once(self.module()))
            .collect::<Vec<_>>()
            .join("::")
    }

    /// File path of the generated file relative to the output directory
    pub fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self.directories.iter().collect();
        path.push(format!("{}.rs", self.module()));
        path
    }
}
