//! Message bus
//!
//! Fine-grained publish/subscribe on scene properties (`PrimKey`) and on
//! application-wide static events (`StaticKey`). Subscribers are notified in
//! a batch, once per flush, no matter how often a key was published.

mod bus;
mod key;

pub use bus::{
    notify_tag_redraw, MsgBus, MsgFreeFn, MsgKeyId, MsgNotifyContext, MsgNotifyFn, MsgOwner,
    MsgUpdateFn, SubscribeKey, SubscribeValue,
};
pub use key::{MsgKey, MsgKeyType, MsgKind, PrimKey, StaticKey};
