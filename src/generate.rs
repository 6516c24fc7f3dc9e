//! One generation run: extract every target, render its artifacts, write them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::codegen::{self, CodeConfig};
use crate::decl::{DeclarationLoader, ModuleDocs};
use crate::docs::DocCommentResolver;
use crate::extract::Extractor;
use crate::idl::{self, IdlConfig, IdlFieldNaming};
use crate::ir::{QualifiedName, RecordSchema};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// IDL settings shared by all targets; the record name comes from the target.
#[derive(Debug, Clone)]
pub struct IdlOptions {
    pub namespace: String,
    pub protocol: String,
    pub data_fabric_type: String,
    pub naming: IdlFieldNaming,
}

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub targets: Vec<QualifiedName>,
    /// `None` skips the code artifact.
    pub code: Option<CodeConfig>,
    /// `None` skips the IDL artifact.
    pub idl: Option<IdlOptions>,
    pub out_dir: PathBuf,
}

/// A rendered file, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub target: QualifiedName,
    pub file_name: String,
    pub contents: String,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl IdlOptions {
    pub fn for_record(&self, record: &str) -> IdlConfig {
        IdlConfig {
            namespace: self.namespace.clone(),
            protocol: self.protocol.clone(),
            data_fabric_type: self.data_fabric_type.clone(),
            record: record.to_string(),
            naming: self.naming,
        }
    }
}

impl GenerateOptions {
    /// Extract and render every target. Targets run in parallel and share one
    /// doc cache; the first failure aborts the run.
    pub fn render<F>(&self, frontend: &F) -> anyhow::Result<Vec<Artifact>>
    where
        F: DeclarationLoader + ModuleDocs + Sync,
    {
        check_targets(&self.targets)?;

        let docs = DocCommentResolver::new(frontend);
        let extractor = Extractor::new(frontend, &docs);

        let per_target = self
            .targets
            .par_iter()
            .map(|target| {
                let schema = extractor
                    .extract(target)
                    .with_context(|| format!("failed to parse struct {target}"))?;
                self.artifacts(&schema)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        debug!(modules = docs.loaded_modules(), "doc cache");
        Ok(per_target.into_iter().flatten().collect())
    }

    /// Render and write every artifact under `out_dir`.
    pub fn run<F>(&self, frontend: &F) -> anyhow::Result<Vec<PathBuf>>
    where
        F: DeclarationLoader + ModuleDocs + Sync,
    {
        let artifacts = self.render(frontend)?;
        write_artifacts(&artifacts, &self.out_dir)
    }

    fn artifacts(&self, schema: &RecordSchema) -> anyhow::Result<Vec<Artifact>> {
        let record = &schema.record;
        let mut out = Vec::with_capacity(2);
        if let Some(config) = &self.code {
            out.push(Artifact {
                target: record.clone(),
                file_name: codegen::file_name(&record.name),
                contents: codegen::render(schema, config),
            });
        }
        if let Some(options) = &self.idl {
            out.push(Artifact {
                target: record.clone(),
                file_name: idl::file_name(&record.name),
                contents: idl::render(schema, &options.for_record(&record.name))
                    .with_context(|| format!("failed to render IDL for {record}"))?,
            });
        }
        Ok(out)
    }
}

pub fn write_artifacts(artifacts: &[Artifact], out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir).with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = out_dir.join(&artifact.file_name);
        std::fs::write(&path, &artifact.contents).with_context(|| format!("failed to write {}", path.display()))?;
        info!(target = %artifact.target, path = %path.display(), "generated");
        written.push(path);
    }
    Ok(written)
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

// output files are named after the bare type name, so two modules may not
// contribute the same one
fn check_targets(targets: &[QualifiedName]) -> anyhow::Result<()> {
    let mut seen = HashSet::new();
    let mut file_stems = HashSet::new();
    for target in targets {
        if !seen.insert(target) {
            bail!("duplicate target {target}");
        }
        if !file_stems.insert(target.name.to_lowercase()) {
            bail!("target {target} would overwrite the output of another target named {}", target.name);
        }
    }
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractError, ValidationErrorKind};
    use crate::frontend::Manifest;

    const MANIFEST: &str = r#"
        [[records]]
        name = "Data"
        [[records.members]]
        name = "some_string"
        type = "String"
        doc = "SomeString is a string."
        [[records.members]]
        name = "another"
        record = "Another"
        embedded = true

        [[records]]
        name = "Another"
        [[records.members]]
        name = "y"
        type = "f64"
        doc = "Y is a float."

        [[records]]
        name = "Broken"
        [[records.members]]
        name = "z"
        type = "u8"
        doc = "Z."
    "#;

    fn manifest() -> Manifest {
        Manifest::from_toml_str(MANIFEST, "test.toml").unwrap()
    }

    fn options(targets: &[&str]) -> GenerateOptions {
        GenerateOptions {
            targets: targets.iter().map(|t| QualifiedName::parse(t)).collect(),
            code: Some(CodeConfig::default()),
            idl: Some(IdlOptions {
                namespace: "ns".into(),
                protocol: "Proto".into(),
                data_fabric_type: "tag".into(),
                naming: IdlFieldNaming::LowerFirst,
            }),
            out_dir: PathBuf::new(),
        }
    }

    #[test]
    fn renders_code_and_idl_per_target_in_order() {
        let artifacts = options(&["Data", "Another"]).render(&manifest()).unwrap();
        let names: Vec<&str> = artifacts.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(
            names,
            ["data_attributes_generated.rs", "data.avdl", "another_attributes_generated.rs", "another.avdl"]
        );
        assert!(artifacts[1].contents.contains("record Data {"));
        assert!(artifacts[1].contents.contains("double? y = null;"));
    }

    #[test]
    fn artifacts_can_be_switched_off() {
        let mut opts = options(&["Data"]);
        opts.code = None;
        let artifacts = opts.render(&manifest()).unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].file_name, "data.avdl");

        opts.idl = None;
        assert!(opts.render(&manifest()).unwrap().is_empty());
    }

    #[test]
    fn failures_name_the_target() {
        let err = options(&["Data", "Broken"]).render(&manifest()).unwrap_err();
        assert!(format!("{err:#}").starts_with("failed to parse struct crate::Broken: type crate::Broken: field z:"));
        let Some(ExtractError::Validation(validation)) = err.downcast_ref::<ExtractError>() else {
            panic!("unexpected {err:?}")
        };
        assert!(matches!(validation.kind, ValidationErrorKind::UnsupportedType { .. }));
    }

    #[test]
    fn duplicate_targets_are_rejected() {
        let err = options(&["Data", "crate::Data"]).render(&manifest()).unwrap_err();
        assert_eq!(err.to_string(), "duplicate target crate::Data");

        let err = check_targets(&[QualifiedName::parse("crate::a::Data"), QualifiedName::parse("crate::b::data")])
            .unwrap_err();
        assert!(err.to_string().contains("would overwrite"));
    }

    #[test]
    fn idl_failures_stop_the_run_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(&["Another"]);
        opts.out_dir = dir.path().join("out");
        opts.idl.as_mut().unwrap().protocol = "Proto col".into();
        let err = opts.run(&manifest()).unwrap_err();
        assert_eq!(
            format!("{err:#}"),
            "failed to render IDL for crate::Another: invalid IDL protocol `Proto col`: expected an identifier"
        );
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn run_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(&["Another"]);
        opts.out_dir = dir.path().join("out");
        let written = opts.run(&manifest()).unwrap();
        assert_eq!(written.len(), 2);
        let code = std::fs::read_to_string(dir.path().join("out/another_attributes_generated.rs")).unwrap();
        assert!(code.starts_with("// This is a generated file. DO NOT EDIT.\n"));
    }
}
