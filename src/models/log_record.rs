// src/models/log_record.rs

use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::{json, Value};
use uuid::Uuid;

const HEX: &[u8] = b"0123456789abcdef";

fn random_hex<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| HEX[rng.gen_range(0..HEX.len())] as char)
        .collect()
}

/// Registro sintético imitando um log do Prometheus rodando no Kubernetes.
pub fn synthetic_record<R: Rng>(rng: &mut R, log_id: usize, now: DateTime<Utc>) -> Value {
    let timestamp = now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
    let pod_id = Uuid::new_v4().to_string();
    let docker_id = random_hex(rng, 64);
    let revision_hash = random_hex(rng, 16);
    let pod_instance: u8 = rng.gen_range(1..=5);

    let log_line = format!(
        "ts={} caller=klog.go:108 level=warn component=k8s_client_runtime func=Warningf \
         msg=\"pkg/mod/k8s.io/client-go@v0.25.1/tools/cache/reflector.go:169: failed to list *v1.Pod: \
         pods is forbidden: User \\\"system:serviceaccount:monitoring:prometheus-k8s\\\" cannot list \
         resource \\\"pods\\\" in API group \\\"\\\" at the cluster scope\" log_id={} unique_id={}",
        timestamp,
        log_id,
        &pod_id[..8]
    );

    json!({
        "kubernetes.annotations.kubectl.kubernetes.io/default-container": "prometheus",
        "kubernetes.annotations.kubernetes.io/psp": "eks.privileged",
        "kubernetes.container_hash": "quay.io/prometheus/prometheus@sha256:4748e26f9369ee7270a7cd3fb9385c1adb441c05792ce2bce2f6dd622fd91d38",
        "kubernetes.container_image": "quay.io/prometheus/prometheus:v2.39.1",
        "kubernetes.container_name": "prometheus",
        "kubernetes.docker_id": docker_id,
        "kubernetes.host": "ip-10-2-50-35.us-east-2.compute.internal",
        "kubernetes.labels.app.kubernetes.io/component": "prometheus",
        "kubernetes.labels.app.kubernetes.io/instance": "k8s",
        "kubernetes.labels.app.kubernetes.io/managed-by": "prometheus-operator",
        "kubernetes.labels.app.kubernetes.io/name": "prometheus",
        "kubernetes.labels.app.kubernetes.io/part-of": "kube-prometheus",
        "kubernetes.labels.app.kubernetes.io/version": "2.39.1",
        "kubernetes.labels.controller-revision-hash": format!("prometheus-k8s-{}", revision_hash),
        "kubernetes.labels.operator.prometheus.io/name": "k8s",
        "kubernetes.labels.operator.prometheus.io/shard": "0",
        "kubernetes.labels.prometheus": "k8s",
        "kubernetes.labels.statefulset.kubernetes.io/pod-name": format!("prometheus-k8s-{}", pod_instance),
        "kubernetes.namespace_name": "monitoring",
        "kubernetes.pod_id": pod_id,
        "kubernetes.pod_name": format!("prometheus-k8s-{}", pod_instance),
        "log": log_line,
        "stream": "stderr"
    })
}
