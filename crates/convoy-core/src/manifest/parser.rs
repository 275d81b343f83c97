//! YAML manifest loader.

use std::path::Path;

use crate::error::{Error, Result};
use crate::manifest::Manifest;

/// Load and validate a manifest file.
pub fn load(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;

    let manifest = parse(&content).map_err(|err| match err {
        Error::ManifestParse { source, .. } => Error::ManifestParse {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;

    Ok(manifest)
}

/// Parse manifest content from a string.
pub fn parse(content: &str) -> Result<Manifest> {
    let manifest: Manifest =
        serde_yaml::from_str(content).map_err(|source| Error::ManifestParse {
            path: Default::default(),
            source,
        })?;

    manifest.validate()?;

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{CheckKind, ComponentKind, ValueKind};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MANIFEST: &str = r#"
components:
  - id: workspace
    type: namespace
    namespace: workspace
    values:
      - name: app.kubernetes.io/managed-by
        type: label
        value: convoy
      - name: convoy.sh/owner
        type: annotation
        value: platform-team
  - id: ingress
    type: helm
    namespace: ingress
    needs: workspace
    source:
      chart: traefik/traefik
      version: "10.3.0"
    wait_complete:
      - type: pod
        selector: "app.kubernetes.io/name=traefik"
      - type: loadbalancer
        selector: traefik
  - id: pipelines
    type: yaml
    namespace: workspace
    needs: ingress
    source:
      path: manifests/pipelines.yaml
    pre_deploy:
      - type: crd
        selector: pipelines.tekton.dev
        namespace: tekton
"#;

    #[test]
    fn parses_valid_manifest() {
        let manifest = parse(MANIFEST).unwrap();
        assert_eq!(manifest.components.len(), 3);

        let ns = manifest.components.get(&"workspace".into()).unwrap();
        assert_eq!(ns.kind, ComponentKind::Namespace);
        assert_eq!(ns.values.len(), 2);
        assert_eq!(ns.values[0].kind, ValueKind::Label);
        assert_eq!(ns.values[1].kind, ValueKind::Annotation);

        let ingress = manifest.components.get(&"ingress".into()).unwrap();
        assert_eq!(ingress.needs.as_ref().unwrap().as_str(), "workspace");
        assert_eq!(ingress.wait_complete.len(), 2);
        assert_eq!(ingress.wait_complete[0].kind, CheckKind::Pod);
        assert_eq!(ingress.wait_complete[1].kind, CheckKind::Loadbalancer);

        let pipelines = manifest.components.get(&"pipelines".into()).unwrap();
        assert_eq!(pipelines.pre_deploy[0].kind, CheckKind::Crd);
        assert_eq!(pipelines.pre_deploy[0].namespace.as_deref(), Some("tekton"));
    }

    #[test]
    fn preserves_declared_order() {
        let manifest = parse(MANIFEST).unwrap();
        let ids: Vec<&str> = manifest
            .components
            .ids()
            .into_iter()
            .map(|id| id.as_str())
            .collect();
        assert_eq!(ids, vec!["workspace", "ingress", "pipelines"]);
    }

    #[test]
    fn unknown_check_type_is_captured() {
        let manifest = parse(
            r#"
components:
  - id: app
    type: namespace
    namespace: app
    wait_complete:
      - type: certificate
        selector: app-tls
"#,
        )
        .unwrap();

        let app = manifest.components.get(&"app".into()).unwrap();
        assert_eq!(
            app.wait_complete[0].kind,
            CheckKind::Other("certificate".to_string())
        );
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = parse(
            r#"
components:
  - id: app
    type: namespace
    namespace: app
  - id: app
    type: namespace
    namespace: other
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate component id 'app'"));
    }

    #[test]
    fn rejects_dangling_needs() {
        let err = parse(
            r#"
components:
  - id: app
    type: namespace
    namespace: app
    needs: missing
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown component 'missing'"));
    }

    #[test]
    fn rejects_self_dependency() {
        let err = parse(
            r#"
components:
  - id: app
    type: namespace
    namespace: app
    needs: app
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("needs itself"));
    }

    #[test]
    fn rejects_helm_without_chart() {
        let err = parse(
            r#"
components:
  - id: app
    type: helm
    namespace: app
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no source.chart"));
    }

    #[test]
    fn rejects_unknown_value_kind() {
        let result = parse(
            r#"
components:
  - id: app
    type: namespace
    namespace: app
    values:
      - name: k
        type: sticker
        value: v
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(MANIFEST.as_bytes()).unwrap();

        let manifest = load(file.path()).unwrap();
        assert_eq!(manifest.components.len(), 3);
    }

    #[test]
    fn read_error_names_the_path() {
        let err = load(Path::new("/nonexistent/convoy.yml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/convoy.yml"));
    }
}
