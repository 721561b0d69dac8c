//! Provider strategies: how to ask each beacon and how to read its answer.
//!
//! Every leaf beacon names a [`registry::StrategyId`]. The registry resolves
//! it to a [`registry::Strategy`], pairing one of twelve request templates
//! with one of seven response encodings:
//!
//! | Parser | Rule |
//! |--------|------|
//! | string yes/no | `yes` → true, `no` → false |
//! | string yes/no + ref check | as above, unknown for unsupported references |
//! | string found | `not found` → false, `found` → true |
//! | JSON exists | boolean field, absent → unknown |
//! | JSON exists, null as false | boolean field, absent → false |
//! | JSON greater than zero | count field, `> 0` → true, `0` → false |
//! | Cafe Variome | `<id without cafe->_response` boolean field |
//!
//! Anything a parser does not recognize is [`crate::core::types::TriBool::Unknown`].

pub mod parser;
pub mod registry;
pub mod request;

pub use parser::ResponseParser;
pub use registry::{Strategy, StrategyId, StrategyRegistry};
pub use request::{HttpMethod, ProviderRequest, RequestFormat};
