//! Built-in manifest templates, used when no override exists.

pub const DEPLOYMENT_FILE: &str = "deployment.yml";
pub const SERVICE_FILE: &str = "service.yml";
pub const POSTGRES_SERVER_FILE: &str = "postgres-server.yml";
pub const KUSTOMIZATION_FILE: &str = "kustomization.yml";

const DEPLOYMENT: &str = r#"---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: {{name}}
  labels:
    app: {{name}}
spec:
  minReadySeconds: 60
  replicas: 1
  selector:
    matchLabels:
      app: {{name}}
  strategy:
    type: RollingUpdate
    rollingUpdate:
      maxSurge: 1
      maxUnavailable: 0
  template:
    metadata:
      labels:
        app: {{name}}
    spec:
      containers:
      - name: {{name}}
        image: {{containerImage}}
        imagePullPolicy: Always
        ports:
        - name: http
          containerPort: 8080
        - name: https
          containerPort: 8443
        envFrom:
        - configMapRef:
            name: {{name}}-env
      terminationGracePeriodSeconds: 180
"#;

const SERVICE: &str = r#"---
apiVersion: v1
kind: Service
metadata:
  name: {{name}}
spec:
  type: ClusterIP
  selector:
    app: {{name}}
  ports:
  - name: http
    port: 8080
    targetPort: 8080
  - name: https
    port: 8443
    targetPort: 8443
"#;

const POSTGRES_SERVER: &str = r#"---
apiVersion: apps/v1
kind: StatefulSet
metadata:
  name: {{name}}
  labels:
    app: {{name}}
spec:
  serviceName: {{name}}
  replicas: 1
  selector:
    matchLabels:
      app: {{name}}
  template:
    metadata:
      labels:
        app: {{name}}
    spec:
      containers:
      - name: {{name}}
        image: postgres:latest
        env:
        - name: POSTGRES_PASSWORD
          value: postgres
        - name: PGDATA
          value: /var/lib/postgresql/data/pgdata
        ports:
        - name: postgres
          containerPort: 5432
        volumeMounts:
        - name: data
          mountPath: /var/lib/postgresql/data
  volumeClaimTemplates:
  - metadata:
      name: data
    spec:
      accessModes: ["ReadWriteOnce"]
      resources:
        requests:
          storage: 1Gi
---
apiVersion: v1
kind: Service
metadata:
  name: {{name}}
spec:
  type: ClusterIP
  selector:
    app: {{name}}
  ports:
  - name: postgres
    port: 5432
    targetPort: 5432
"#;

const KUSTOMIZATION: &str = r#"apiVersion: kustomize.config.k8s.io/v1beta1
kind: Kustomization
resources:
  {{manifests}}

generatorOptions:
  disableNameSuffixHash: true

configMapGenerator:
- name: {{name}}-env
  literals:
    {{env}}
"#;

/// The built-in template for a manifest file name.
pub fn template(file: &str) -> Option<&'static str> {
    match file {
        DEPLOYMENT_FILE => Some(DEPLOYMENT),
        SERVICE_FILE => Some(SERVICE),
        POSTGRES_SERVER_FILE => Some(POSTGRES_SERVER),
        KUSTOMIZATION_FILE => Some(KUSTOMIZATION),
        _ => None,
    }
}
