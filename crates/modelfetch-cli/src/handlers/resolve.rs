//! `modelfetch resolve` handler.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use modelfetch_core::{ImportsResolved, LoadOptions, ModelFile, ModelSet};
use modelfetch_download::{DownloaderConfig, ModelDownloader};
use modelfetch_loader::LoaderConfig;
use serde::Serialize;

use crate::commands::ResolveArgs;
use crate::error::CliError;

/// One downloaded model as printed with `--json`.
#[derive(Debug, Serialize)]
struct ResolvedModel<'a> {
    namespace: &'a str,
    name: Option<&'a str>,
    imports: &'a BTreeMap<String, String>,
}

/// Execute the resolve command.
///
/// # Errors
///
/// - [`CliError::Io`] if an input file cannot be read or an output written
/// - [`CliError::Model`] if an input file has no namespace declaration
/// - [`CliError::Resolve`] if any download fails or, with
///   `--check-imports`, an import stays unresolved
pub async fn execute(args: ResolveArgs) -> Result<(), CliError> {
    let locals = read_models(&args.files).await?;
    let downloader = ModelDownloader::with_default_loader(&LoaderConfig::default())?
        .with_config(downloader_config(&args));
    let options = load_options(&args);

    let checked = args.check_imports.then(|| local_set(&locals)).transpose()?;

    let fetched = downloader
        .download_external_dependencies(&locals, options)
        .await?;

    if let Some(mut set) = checked {
        let applied = check_imports(&mut set, &fetched)?;
        tracing::info!(applied, models = set.len(), "All imports resolved");
    }

    if let Some(dir) = &args.out_dir {
        let written = write_models(dir, &fetched).await?;
        tracing::info!(dir = %dir.display(), files = written.len(), "Saved downloaded models");
    }

    print!("{}", render(&fetched, args.json)?);
    Ok(())
}

/// Read and scan local model files, named after their file names.
async fn read_models(paths: &[PathBuf]) -> Result<Vec<ModelFile>, CliError> {
    let mut models = Vec::with_capacity(paths.len());
    for path in paths {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        let model = ModelFile::new(text, name).map_err(|e| CliError::Model {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), namespace = model.namespace(), "Read local model");
        models.push(model);
    }
    Ok(models)
}

/// Key local models by namespace, rejecting duplicates.
fn local_set(locals: &[ModelFile]) -> Result<ModelSet, CliError> {
    let mut set = ModelSet::new();
    for model in locals {
        set.add(model.clone())?;
    }
    Ok(set)
}

/// Merge `fetched` into `set` and require every import to resolve.
///
/// Returns the number of namespaces applied. `fetched` keeps its order.
fn check_imports(set: &mut ModelSet, fetched: &[ModelFile]) -> Result<usize, CliError> {
    Ok(set.apply_external(fetched.to_vec(), &ImportsResolved)?)
}

fn load_options(args: &ResolveArgs) -> LoadOptions {
    let mut options = LoadOptions::new().with_optional_bearer_token(args.token.clone());
    for (name, value) in &args.headers {
        options = options.with_header(name, value);
    }
    if let Some(secs) = args.timeout_secs {
        options = options.with_timeout(Duration::from_secs(secs));
    }
    options
}

fn downloader_config(args: &ResolveArgs) -> DownloaderConfig {
    DownloaderConfig::new()
        .with_start_delay(Duration::from_millis(args.start_delay_ms))
        .with_job_delay(Duration::from_millis(args.job_delay_ms))
        .with_max_models((args.max_models > 0).then_some(args.max_models))
}

/// File name a downloaded model is saved under.
fn output_file_name(model: &ModelFile) -> String {
    let name = model.name().unwrap_or_else(|| model.namespace());
    if Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("cto"))
    {
        name.to_string()
    } else {
        format!("{name}.cto")
    }
}

/// Write each model's definitions into `dir`. Returns the written paths.
async fn write_models(dir: &Path, models: &[ModelFile]) -> Result<Vec<PathBuf>, CliError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| CliError::Io(format!("{}: {e}", dir.display())))?;

    let mut written = Vec::with_capacity(models.len());
    for model in models {
        let path = dir.join(output_file_name(model));
        tokio::fs::write(&path, model.definitions())
            .await
            .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
        written.push(path);
    }
    Ok(written)
}

fn render(models: &[ModelFile], json: bool) -> Result<String, CliError> {
    if json {
        let resolved: Vec<ResolvedModel<'_>> = models
            .iter()
            .map(|model| ResolvedModel {
                namespace: model.namespace(),
                name: model.name(),
                imports: model.external_imports(),
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&resolved)? + "\n");
    }

    if models.is_empty() {
        return Ok("No external models to download.\n".to_string());
    }
    Ok(models
        .iter()
        .map(|model| format!("{}\t{}\n", model.namespace(), model.name().unwrap_or("-")))
        .collect())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::commands::Commands;
    use crate::parser::Cli;

    fn args(extra: &[&str]) -> ResolveArgs {
        let argv = ["modelfetch", "resolve", "a.cto"].iter().chain(extra).copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Resolve(args) => args,
        }
    }

    fn fetched(text: &str, name: &str) -> ModelFile {
        ModelFile::new(text, Some(name.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_read_models_names_by_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acme.cto");
        std::fs::write(
            &path,
            "namespace org.acme\nimport org.base.* from https://m/base.cto\n",
        )
        .unwrap();

        let models = read_models(&[path]).await.unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name(), Some("acme.cto"));
        assert_eq!(
            models[0].import_uri("org.base.*"),
            Some("https://m/base.cto")
        );
    }

    #[tokio::test]
    async fn test_read_models_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = read_models(&[dir.path().join("missing.cto")])
            .await
            .unwrap_err();
        assert_eq!(missing.exit_code(), 74);

        let path = dir.path().join("bad.cto");
        std::fs::write(&path, "asset Thing identified by id {}").unwrap();
        let invalid = read_models(&[path]).await.unwrap_err();
        assert!(matches!(invalid, CliError::Model { .. }));
    }

    #[test]
    fn test_local_set_rejects_duplicate_namespace() {
        let a = fetched("namespace org.a", "a.cto");
        let err = local_set(&[a.clone(), a]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_check_imports_keeps_completion_order() {
        let mut set = local_set(&[fetched(
            "namespace org.local\nimport org.z.* from https://m/z.cto",
            "local.cto",
        )])
        .unwrap();
        // completion order differs from namespace order
        let completed = [
            fetched("namespace org.z\nimport org.a.* from https://m/a.cto", "@m.z.cto"),
            fetched("namespace org.a", "@m.a.cto"),
        ];

        assert_eq!(check_imports(&mut set, &completed).unwrap(), 2);
        assert_eq!(set.len(), 3);
        assert_eq!(
            render(&completed, false).unwrap(),
            "org.z\t@m.z.cto\norg.a\t@m.a.cto\n"
        );
    }

    #[test]
    fn test_check_imports_reports_unresolved_import() {
        let mut set = local_set(&[fetched(
            "namespace org.local\nimport org.z.* from https://m/z.cto",
            "local.cto",
        )])
        .unwrap();
        let completed = [fetched("namespace org.z\nimport org.gone.Thing", "@m.z.cto")];

        let err = check_imports(&mut set, &completed).unwrap_err();
        assert!(matches!(err, CliError::Resolve(_)));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_load_options_from_flags() {
        let options = load_options(&args(&[
            "--header",
            "x-api-key=abc",
            "--timeout-secs",
            "5",
            "--token",
            "t0k",
        ]));
        assert_eq!(options.headers.get("x-api-key").map(String::as_str), Some("abc"));
        assert_eq!(options.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(options.bearer_token.as_deref(), Some("t0k"));
    }

    #[test]
    fn test_downloader_config_from_flags() {
        let config = downloader_config(&args(&[
            "--start-delay-ms",
            "300",
            "--job-delay-ms",
            "50",
            "--max-models",
            "0",
        ]));
        assert_eq!(config.queue().start_delay(), Duration::from_millis(300));
        assert_eq!(config.queue().job_delay(), Duration::from_millis(50));
        assert_eq!(config.max_models(), None);

        assert_eq!(downloader_config(&args(&[])).max_models(), Some(1024));
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            output_file_name(&fetched("namespace org.a", "@m.example.com.a.cto")),
            "@m.example.com.a.cto"
        );
        assert_eq!(
            output_file_name(&fetched("namespace org.a", "@m.example.com.models.a")),
            "@m.example.com.models.a.cto"
        );
        assert_eq!(
            output_file_name(&ModelFile::new("namespace org.a", None).unwrap()),
            "org.a.cto"
        );
    }

    #[tokio::test]
    async fn test_write_models() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("external");
        let models = [fetched("namespace org.a\n", "@m.a.cto")];

        let written = write_models(&out, &models).await.unwrap();
        assert_eq!(written, vec![out.join("@m.a.cto")]);
        assert_eq!(
            std::fs::read_to_string(&written[0]).unwrap(),
            "namespace org.a\n"
        );
    }

    #[test]
    fn test_render_text_and_json() {
        let models = [fetched(
            "namespace org.a\nimport org.b.* from https://m/b.cto",
            "@m.a.cto",
        )];

        assert_eq!(render(&models, false).unwrap(), "org.a\t@m.a.cto\n");
        assert_eq!(
            render(&[], false).unwrap(),
            "No external models to download.\n"
        );

        let json: serde_json::Value = serde_json::from_str(&render(&models, true).unwrap()).unwrap();
        assert_eq!(json[0]["namespace"], "org.a");
        assert_eq!(json[0]["name"], "@m.a.cto");
        assert_eq!(json[0]["imports"]["org.b.*"], "https://m/b.cto");
    }
}
