//! Default-value functions for `#[serde(default = "...")]`

pub fn bool_true() -> bool {
    true
}

pub fn bool_false() -> bool {
    false
}
