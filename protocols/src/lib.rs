//! Wire formats used by the probers.

pub mod icmp;
