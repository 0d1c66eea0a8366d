//! Liveness probe implementations.

mod icmp;

pub use icmp::IcmpProbeSender;
