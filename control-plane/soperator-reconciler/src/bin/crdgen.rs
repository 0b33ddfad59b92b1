use kube::core::CustomResourceExt;
use soperator_reconciler::crd::slurm_cluster::SlurmCluster;

fn main() {
    let crd = SlurmCluster::crd();
    let yaml = serde_yaml::to_string(&crd).expect("serialize CRD to YAML");
    println!("{}", yaml);
}
