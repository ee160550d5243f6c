mod constrained;
mod kmeans;
mod macro_partition;
mod transport;

pub(crate) use constrained::cluster as micro_cluster;
pub(crate) use macro_partition::partition as macro_partition;
