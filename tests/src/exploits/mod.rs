//! # Exploit Tests
//!
//! Attacks an on-path adversary can mount against the link, and what the
//! client does about each.
//!
//! | Attack | Expected outcome |
//! |--------|------------------|
//! | Replay a device frame | `Replay`, session intact |
//! | Re-stamp a captured frame's counter | `Replay` via nonce window |
//! | Frame from a previous session | `Authentication` |
//! | Flip bits in a handshake envelope | no session |
//! | Flip bits in a channel response | `Authentication`, session intact |
//! | Substitute keys in the unwrapped variant | succeeds (no server auth) |

pub mod replay;
