//! Scaffolding of DTO source files
//!
//! `make-dto Admin/UserProfile` resolves the name, renders the stub template
//! and writes `src/dto/admin/user_profile.rs`. Existing files are only
//! overwritten after confirmation or with `--force`.

pub mod naming;

pub use naming::{Casing, DtoName};

use crate::config::ScaffoldConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Stub used when no custom stub is configured
pub const DEFAULT_STUB: &str = include_str!("../../stubs/dto.stub");

/// Default destination of `publish-stub`
pub const PUBLISHED_STUB_PATH: &str = "stubs/dto.stub";

/// Errors raised while generating a DTO file
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error(
        "Invalid DTO name '{name}': use letters, digits, underscores and forward slashes only"
    )]
    InvalidName { name: String },

    #[error("Stub file not found: {}", path.display())]
    StubNotFound { path: PathBuf },

    #[error("Failed to read stub {}: {source}", path.display())]
    StubUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to render stub: {0}")]
    Render(#[from] tera::Error),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} already exists (use --force to overwrite)", path.display())]
    AlreadyExists { path: PathBuf },
}

/// Everything needed to write one DTO file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub name: DtoName,
    pub namespace: String,
    pub path: PathBuf,
}

/// Result of [`Scaffolder::generate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(PathBuf),
    Overwritten(PathBuf),
    /// The file existed and overwriting was declined
    Aborted(PathBuf),
}

impl Outcome {
    pub fn path(&self) -> &Path {
        match self {
            Outcome::Created(path) | Outcome::Overwritten(path) | Outcome::Aborted(path) => path,
        }
    }

    /// Message shown to the user
    pub fn message(&self) -> String {
        match self {
            Outcome::Created(path) | Outcome::Overwritten(path) => {
                format!("DTO [{}] created successfully.", path.display())
            }
            Outcome::Aborted(path) => {
                format!("DTO [{}] already exists, nothing written.", path.display())
            }
        }
    }
}

/// Generates DTO files from a stub
#[derive(Debug, Clone, Default)]
pub struct Scaffolder {
    config: ScaffoldConfig,
}

impl Scaffolder {
    pub fn new(config: ScaffoldConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScaffoldConfig {
        &self.config
    }

    /// Resolve the class name, namespace and target path for `name`
    pub fn plan(&self, name: &str) -> Result<Plan, ScaffoldError> {
        let name = DtoName::parse(name)?;
        let namespace = name.namespace(&self.config.namespace);
        let path = self.config.output_dir.join(name.relative_path());
        Ok(Plan {
            name,
            namespace,
            path,
        })
    }

    /// Read the configured stub, or the built-in one
    pub fn load_stub(&self) -> Result<String, ScaffoldError> {
        let Some(path) = &self.config.stub else {
            return Ok(DEFAULT_STUB.to_string());
        };

        if !path.is_file() {
            return Err(ScaffoldError::StubNotFound { path: path.clone() });
        }

        fs::read_to_string(path).map_err(|source| ScaffoldError::StubUnreadable {
            path: path.clone(),
            source,
        })
    }

    /// Render the stub for a plan
    pub fn render(&self, plan: &Plan) -> Result<String, ScaffoldError> {
        let stub = self.load_stub()?;
        let mut context = tera::Context::new();
        context.insert("namespace", &plan.namespace);
        context.insert("class", plan.name.class());
        Ok(tera::Tera::one_off(&stub, &context, false)?)
    }

    /// Write the DTO file for `name`
    ///
    /// `confirm` is asked before an existing file is replaced.
    pub fn generate<F>(&self, name: &str, confirm: F) -> Result<Outcome, ScaffoldError>
    where
        F: FnOnce(&Path) -> bool,
    {
        let plan = self.plan(name)?;
        let existed = plan.path.exists();

        if existed && !confirm(&plan.path) {
            tracing::info!(path = %plan.path.display(), "Keeping existing DTO");
            return Ok(Outcome::Aborted(plan.path));
        }

        let contents = self.render(&plan)?;
        write_file(&plan.path, &contents)?;

        tracing::info!(
            class = plan.name.class(),
            namespace = %plan.namespace,
            path = %plan.path.display(),
            "DTO generated"
        );

        Ok(if existed {
            Outcome::Overwritten(plan.path)
        } else {
            Outcome::Created(plan.path)
        })
    }
}

/// Copy the built-in stub to `dest` so it can be customized
pub fn publish_stub(dest: &Path, force: bool) -> Result<PathBuf, ScaffoldError> {
    if dest.exists() && !force {
        return Err(ScaffoldError::AlreadyExists {
            path: dest.to_path_buf(),
        });
    }

    write_file(dest, DEFAULT_STUB)?;
    tracing::info!(path = %dest.display(), "Stub published");
    Ok(dest.to_path_buf())
}

fn write_file(path: &Path, contents: &str) -> Result<(), ScaffoldError> {
    let write_error = |source: io::Error| ScaffoldError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, contents).map_err(write_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaffolder(root: &Path) -> Scaffolder {
        Scaffolder::new(ScaffoldConfig {
            output_dir: root.join("dto"),
            ..ScaffoldConfig::default()
        })
    }

    #[test]
    fn test_plan_resolves_path_and_namespace() {
        let scaffolder = Scaffolder::new(ScaffoldConfig::default());
        let plan = scaffolder.plan("Admin/user_profile").unwrap();
        assert_eq!(plan.name.class(), "UserProfile");
        assert_eq!(plan.namespace, "dto::admin::user_profile");
        assert_eq!(
            plan.path,
            PathBuf::from("src/dto").join("admin").join("user_profile.rs")
        );
    }

    #[test]
    fn test_default_stub_renders_placeholders() {
        let scaffolder = Scaffolder::new(ScaffoldConfig::default());
        let plan = scaffolder.plan("CreateUser").unwrap();
        let rendered = scaffolder.render(&plan).unwrap();
        assert!(rendered.contains("pub struct CreateUserSchema => CreateUser"));
        assert!(rendered.contains("dto::create_user::CreateUser"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn test_generate_creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = scaffolder(dir.path())
            .generate("Billing/Invoice", |_| panic!("nothing to confirm"))
            .unwrap();

        let expected = dir.path().join("dto").join("billing").join("invoice.rs");
        assert_eq!(outcome, Outcome::Created(expected.clone()));
        assert!(expected.is_file());
        assert_eq!(
            outcome.message(),
            format!("DTO [{}] created successfully.", expected.display())
        );
    }

    #[test]
    fn test_generate_declined_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let scaffolder = scaffolder(dir.path());
        let path = scaffolder.plan("Invoice").unwrap().path;
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "keep me").unwrap();

        let outcome = scaffolder.generate("Invoice", |_| false).unwrap();
        assert_eq!(outcome, Outcome::Aborted(path.clone()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[test]
    fn test_generate_confirmed_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let scaffolder = scaffolder(dir.path());
        let path = scaffolder.plan("Invoice").unwrap().path;
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "old").unwrap();

        let outcome = scaffolder.generate("Invoice", |_| true).unwrap();
        assert_eq!(outcome, Outcome::Overwritten(path.clone()));
        assert!(fs::read_to_string(&path).unwrap().contains("InvoiceSchema"));
    }

    #[test]
    fn test_missing_custom_stub() {
        let dir = tempfile::tempdir().unwrap();
        let scaffolder = Scaffolder::new(ScaffoldConfig {
            output_dir: dir.path().to_path_buf(),
            stub: Some(dir.path().join("nope.stub")),
            ..ScaffoldConfig::default()
        });

        let err = scaffolder.generate("Invoice", |_| true).unwrap_err();
        assert!(matches!(err, ScaffoldError::StubNotFound { .. }));
        assert!(!dir.path().join("invoice.rs").exists());
    }

    #[test]
    fn test_custom_stub_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let stub = dir.path().join("custom.stub");
        fs::write(&stub, "// {{ namespace }} / {{ class }}\n").unwrap();

        let scaffolder = Scaffolder::new(ScaffoldConfig {
            namespace: "app::dto".into(),
            output_dir: dir.path().join("out"),
            stub: Some(stub),
        });
        let outcome = scaffolder.generate("Admin/User", |_| true).unwrap();
        assert_eq!(
            fs::read_to_string(outcome.path()).unwrap(),
            "// app::dto::admin::user / User\n"
        );
    }

    #[test]
    fn test_invalid_name_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let err = scaffolder(dir.path())
            .generate("bad-name", |_| true)
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::InvalidName { .. }));
        assert!(!dir.path().join("dto").exists());
    }

    #[test]
    fn test_publish_stub_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("stubs").join("dto.stub");

        publish_stub(&dest, false).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), DEFAULT_STUB);

        let err = publish_stub(&dest, false).unwrap_err();
        assert!(matches!(err, ScaffoldError::AlreadyExists { .. }));
        assert!(publish_stub(&dest, true).is_ok());
    }
}
