/*!
Miscellaneous items related to [logging](log).

Calls to the log macro are made throughout the library with a target from
[targets], so output can be narrowed to the part of the engine of interest.
No log implementation is provided --- see [log].

For example, with [env_logger](https://docs.rs/env_logger/latest/env_logger/),
logs of the layer store can be filtered with `RUST_LOG=layers …`.
*/

/// Targets to be used within a [log]! macro.
pub mod targets {
    pub const BUILD: &str = "build";
    pub const EXTEND: &str = "extend";
    pub const INVARIANT: &str = "invariant";
    pub const LAYERS: &str = "layers";
    pub const OBLIGATIONS: &str = "obligations";
    pub const POSTPROCESS: &str = "postprocess";
    pub const PUSHING: &str = "pushing";
}
