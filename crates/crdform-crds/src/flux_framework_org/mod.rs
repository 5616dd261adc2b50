//! `flux-framework.org` API group (Flux Operator)

pub mod mini_cluster_v1alpha1;
