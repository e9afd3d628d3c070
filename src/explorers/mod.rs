//! Concrete block-explorer `Verifier` implementations (§6). Only Bitcoin has
//! a shipped HTTP client; Litecoin/Ethereum are left as extension points
//! behind the same `Verifier` trait (see DESIGN.md).

pub mod bitcoin;
