//! `flux-framework.org/v1alpha1` `MiniCluster`
//!
//! A MiniCluster is an indexed job running a Flux instance across a set of
//! pods, one broker per pod.

use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crdform_core::{Attribute, AttributeType, Attributes, Validator, attributes};

use crate::kind::CustomResourceKind;

pub struct MiniCluster;

impl CustomResourceKind for MiniCluster {
    const GROUP: &'static str = "flux-framework.org";
    const VERSION: &'static str = "v1alpha1";
    const KIND: &'static str = "MiniCluster";
    const PLURAL: &'static str = "miniclusters";
    const NAMESPACED: bool = true;
    const SPEC_REQUIRED: bool = true;
    const DESCRIPTION: &'static str = "MiniCluster is the Schema for a Flux job";

    type Spec = MiniClusterSpec;

    fn spec_attributes() -> Attributes {
        spec_attributes()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniClusterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containers: Option<Vec<MiniClusterContainer>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<MiniClusterUser>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<BTreeMap<String, MiniClusterVolume>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod: Option<PodSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_labels: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flux: Option<FluxSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flux_restful: Option<FluxRestful>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_seconds: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_process_namespace: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<Archive>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniClusterContainer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_always: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_flux: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cores: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<i32>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<BTreeMap<String, ContainerVolume>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ContainerResources>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_cycle: Option<LifeCycle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<BTreeMap<String, Secret>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<SecurityContext>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<Commands>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_raw: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launcher: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MiniClusterUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniClusterVolume {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_handle: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_annotations: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerVolume {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerResources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<BTreeMap<String, IntOrString>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<BTreeMap<String, IntOrString>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeCycle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_start_exec: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_stop_exec: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileged: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_capabilities: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commands {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker_pre: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_pre: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_flux_as_root: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<BTreeMap<String, IntOrString>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FluxSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_flags: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_root: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimal_service: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve_cert: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker_config: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bursting: Option<Bursting>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bursting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_broker: Option<LeadBroker>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clusters: Option<Vec<BurstedCluster>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadBroker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BurstedCluster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiet: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timed: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zeromq: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FluxRestful {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headless_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

const MAX_PORT: i64 = 65535;

fn port() -> Attribute {
    Attribute::int32()
        .optional()
        .validate(Validator::AtLeast(1))
        .validate(Validator::AtMost(MAX_PORT))
}

fn string_map() -> Attribute {
    Attribute::map(AttributeType::String).optional()
}

fn container_attributes() -> Attributes {
    attributes([
        (
            "name",
            Attribute::string()
                .optional()
                .describe("Container name, only required for non flux runners."),
        ),
        (
            "image",
            Attribute::string()
                .optional()
                .describe("Container image, must contain flux and flux-sched."),
        ),
        ("working_dir", Attribute::string().optional()),
        (
            "command",
            Attribute::string()
                .optional()
                .describe("Single user executable to provide to flux start."),
        ),
        ("pull_always", Attribute::bool().optional()),
        (
            "image_pull_secret",
            Attribute::string()
                .optional()
                .describe("Name of an existing secret with registry credentials."),
        ),
        (
            "run_flux",
            Attribute::bool()
                .optional()
                .describe("Main container to run flux (only should be one)."),
        ),
        ("cores", Attribute::int32().optional().validate(Validator::AtLeast(0))),
        (
            "environment",
            string_map().describe("Key/value pairs for the environment."),
        ),
        (
            "ports",
            Attribute::list(AttributeType::Int64)
                .optional()
                .validate(Validator::AtLeast(1))
                .validate(Validator::AtMost(MAX_PORT)),
        ),
        (
            "volumes",
            Attribute::map_nested(attributes([
                ("path", Attribute::string().required()),
                ("read_only", Attribute::bool().optional()),
            ]))
            .optional()
            .describe("Existing volumes to mount, keyed by MiniCluster volume name."),
        ),
        (
            "resources",
            Attribute::single_nested(attributes([
                ("limits", Attribute::map(AttributeType::Dynamic).optional()),
                ("requests", Attribute::map(AttributeType::Dynamic).optional()),
            ]))
            .optional(),
        ),
        (
            "life_cycle",
            Attribute::single_nested(attributes([
                ("post_start_exec", Attribute::string().optional()),
                ("pre_stop_exec", Attribute::string().optional()),
            ]))
            .optional(),
        ),
        (
            "secrets",
            Attribute::map_nested(attributes([
                ("key", Attribute::string().required()),
                ("name", Attribute::string().required()),
            ]))
            .optional()
            .describe("Secrets exposed as environment variables, keyed by variable name."),
        ),
        (
            "security_context",
            Attribute::single_nested(attributes([
                ("privileged", Attribute::bool().optional()),
                (
                    "add_capabilities",
                    Attribute::list(AttributeType::String).optional(),
                ),
            ]))
            .optional(),
        ),
        (
            "commands",
            Attribute::single_nested(attributes([
                ("pre", Attribute::string().optional()),
                ("post", Attribute::string().optional()),
                ("init", Attribute::string().optional()),
                ("broker_pre", Attribute::string().optional()),
                ("worker_pre", Attribute::string().optional()),
                ("prefix", Attribute::string().optional()),
                ("run_flux_as_root", Attribute::bool().optional()),
            ]))
            .optional()
            .describe("Custom commands run around flux start."),
        ),
        ("batch", Attribute::bool().optional()),
        ("batch_raw", Attribute::bool().optional()),
        ("diagnostics", Attribute::bool().optional()),
        ("launcher", Attribute::bool().optional()),
        ("logs", Attribute::string().optional()),
    ])
}

fn spec_attributes() -> Attributes {
    attributes([
        (
            "containers",
            Attribute::list_nested(container_attributes())
                .required()
                .describe("Containers of the MiniCluster pods."),
        ),
        (
            "users",
            Attribute::list_nested(attributes([
                ("name", Attribute::string().required()),
                ("password", Attribute::string().optional().sensitive()),
            ]))
            .optional()
            .describe("Users of the MiniCluster."),
        ),
        (
            "volumes",
            Attribute::map_nested(attributes([
                ("path", Attribute::string().required()),
                ("capacity", Attribute::string().optional()),
                ("storage_class", Attribute::string().optional()),
                ("class", Attribute::string().optional()),
                ("delete", Attribute::bool().optional()),
                ("driver", Attribute::string().optional()),
                ("secret", Attribute::string().optional()),
                ("secret_namespace", Attribute::string().optional()),
                ("volume_handle", Attribute::string().optional()),
                ("labels", string_map()),
                ("annotations", string_map()),
                ("attributes", string_map()),
                ("claim_annotations", string_map()),
            ]))
            .optional()
            .describe("Volumes accessible to containers, keyed by name."),
        ),
        (
            "pod",
            Attribute::single_nested(attributes([
                ("annotations", string_map()),
                ("labels", string_map()),
                ("node_selector", string_map()),
                ("resources", Attribute::map(AttributeType::Dynamic).optional()),
                ("service_account_name", Attribute::string().optional()),
            ]))
            .optional()
            .describe("Pod spec details."),
        ),
        ("job_labels", string_map()),
        (
            "interactive",
            Attribute::bool()
                .optional()
                .describe("Run a single-user, interactive minicluster."),
        ),
        (
            "flux",
            Attribute::single_nested(attributes([
                ("option_flags", Attribute::string().optional()),
                ("connect_timeout", Attribute::string().optional()),
                ("install_root", Attribute::string().optional()),
                (
                    "log_level",
                    Attribute::int32()
                        .optional()
                        .validate(Validator::AtLeast(0))
                        .validate(Validator::AtMost(7)),
                ),
                ("minimal_service", Attribute::bool().optional()),
                ("wrap", Attribute::string().optional()),
                ("curve_cert", Attribute::string().optional()),
                ("broker_config", Attribute::string().optional()),
                (
                    "bursting",
                    Attribute::single_nested(attributes([
                        (
                            "lead_broker",
                            Attribute::single_nested(attributes([
                                ("address", Attribute::string().required()),
                                ("name", Attribute::string().required()),
                                ("port", port()),
                                ("size", Attribute::int32().required()),
                            ]))
                            .optional(),
                        ),
                        (
                            "clusters",
                            Attribute::list_nested(attributes([
                                ("name", Attribute::string().optional()),
                                ("size", Attribute::int32().optional()),
                            ]))
                            .optional(),
                        ),
                    ]))
                    .optional(),
                ),
            ]))
            .optional()
            .describe("Flux broker and resource manager settings."),
        ),
        (
            "logging",
            Attribute::single_nested(attributes([
                ("debug", Attribute::bool().optional()),
                ("quiet", Attribute::bool().optional()),
                ("strict", Attribute::bool().optional()),
                ("timed", Attribute::bool().optional()),
                ("zeromq", Attribute::bool().optional()),
            ]))
            .optional(),
        ),
        (
            "flux_restful",
            Attribute::single_nested(attributes([
                ("branch", Attribute::string().optional()),
                ("port", port()),
                ("secret_key", Attribute::string().optional().sensitive()),
                ("token", Attribute::string().optional().sensitive()),
                ("username", Attribute::string().optional()),
            ]))
            .optional(),
        ),
        (
            "deadline_seconds",
            Attribute::int64().optional().validate(Validator::AtLeast(1)),
        ),
        (
            "size",
            Attribute::int32()
                .optional()
                .validate(Validator::AtLeast(1))
                .describe("Number of pods to create for the MiniCluster."),
        ),
        (
            "max_size",
            Attribute::int32()
                .optional()
                .validate(Validator::AtLeast(1))
                .describe("Upper bound the cluster may be scaled to."),
        ),
        ("tasks", Attribute::int32().optional().validate(Validator::AtLeast(1))),
        ("cleanup", Attribute::bool().optional()),
        ("share_process_namespace", Attribute::bool().optional()),
        (
            "network",
            Attribute::single_nested(attributes([(
                "headless_name",
                Attribute::string().optional(),
            )]))
            .optional(),
        ),
        (
            "archive",
            Attribute::single_nested(attributes([("path", Attribute::string().optional())]))
                .optional(),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::CrdObject;

    const SAMPLE: &str = r#"
apiVersion: flux-framework.org/v1alpha1
kind: MiniCluster
metadata:
  name: flux-sample
  namespace: flux-operator
spec:
  size: 4
  tasks: 2
  logging:
    quiet: true
  containers:
    - image: ghcr.io/flux-framework/flux-restful-api:latest
      command: lmp -- -i in.reaxc.hns
      workingDir: /home/flux/examples/reaxff/HNS
      runFlux: true
      resources:
        limits:
          cpu: 2
          memory: 4Gi
      volumes:
        data:
          path: /data
          readOnly: true
  volumes:
    data:
      path: /tmp/workflow
      storageClass: hostpath
"#;

    #[test]
    fn test_parse_sample() {
        let object: CrdObject<MiniClusterSpec> = serde_yaml::from_str(SAMPLE).unwrap();
        let spec = object.spec.unwrap();
        assert_eq!(spec.size, Some(4));
        assert_eq!(spec.logging.unwrap().quiet, Some(true));

        let container = &spec.containers.unwrap()[0];
        assert_eq!(container.run_flux, Some(true));
        assert_eq!(
            container.working_dir.as_deref(),
            Some("/home/flux/examples/reaxff/HNS")
        );
        let limits = container.resources.as_ref().unwrap().limits.as_ref().unwrap();
        assert_eq!(limits["cpu"], IntOrString::Int(2));
        assert_eq!(limits["memory"], IntOrString::String("4Gi".to_string()));
        assert_eq!(
            container.volumes.as_ref().unwrap()["data"].read_only,
            Some(true)
        );

        let volume = &spec.volumes.unwrap()["data"];
        assert_eq!(volume.storage_class.as_deref(), Some("hostpath"));
    }

    #[test]
    fn test_round_trip() {
        let spec = MiniClusterSpec {
            size: Some(2),
            max_size: Some(8),
            interactive: Some(false),
            containers: Some(vec![MiniClusterContainer {
                image: Some("ghcr.io/rse-ops/lammps:flux-sched-focal".to_string()),
                environment: Some(BTreeMap::from([(
                    "OMPI_MCA_btl".to_string(),
                    "tcp,self".to_string(),
                )])),
                ports: Some(vec![5000]),
                commands: Some(Commands {
                    pre: Some("echo hello".to_string()),
                    run_flux_as_root: Some(false),
                    ..Default::default()
                }),
                ..Default::default()
            }]),
            flux: Some(FluxSpec {
                log_level: Some(6),
                bursting: Some(Bursting {
                    lead_broker: Some(LeadBroker {
                        address: Some("10.0.0.4".to_string()),
                        name: Some("flux-sample-0".to_string()),
                        port: Some(8050),
                        size: Some(4),
                    }),
                    clusters: Some(vec![BurstedCluster {
                        name: Some("burst-0".to_string()),
                        size: Some(2),
                    }]),
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["flux"]["bursting"]["leadBroker"]["port"], 8050);
        assert_eq!(json["containers"][0]["commands"]["runFluxAsRoot"], false);

        let back: MiniClusterSpec = serde_json::from_value(json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn test_integer_fields_fit_the_wire_type() {
        let schema = crdform_core::Schema::new("MiniCluster")
            .with_attribute("spec", Attribute::single_nested(spec_attributes()));
        let diags = schema.validate_config(&serde_json::json!({
            "spec": {
                "size": 4294967296i64,
                "containers": [{ "image": "flux", "ports": [5000, 70000] }],
                "flux": { "bursting": { "lead_broker": {
                    "address": "10.0.0.4", "name": "lead", "size": -2147483649i64
                } } }
            }
        }));
        let paths: Vec<_> = diags.errors().filter_map(|d| d.attribute.clone()).collect();
        assert!(paths.contains(&"spec.size".to_string()));
        assert!(paths.contains(&"spec.containers[0].ports".to_string()));
        assert!(paths.contains(&"spec.flux.bursting.lead_broker.size".to_string()));

        let diags = schema.validate_config(&serde_json::json!({
            "spec": { "size": i32::MAX, "containers": [{ "image": "flux", "ports": [5000] }] }
        }));
        assert!(diags.is_empty(), "unexpected diagnostics: {}", diags);
    }

    #[test]
    fn test_containers_required() {
        let attrs = spec_attributes();
        assert!(attrs["containers"].required);
        assert!(attrs["users"].optional);
    }
}
