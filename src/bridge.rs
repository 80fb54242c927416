//! The remote-procedure surface the host application talks to.
//!
//! The transport itself lives outside this crate. What it hands us is a
//! [`MethodCall`] (method name + JSON arguments) and a [`Responder`] for the
//! reply; what we hand back is exactly one `success`, `error`, or
//! `not_implemented` per call, possibly long after the call returned.
//!
//! ## Methods
//!
//! | Method | Arguments | Reply |
//! |---|---|---|
//! | `pickImages` | `{quantity?, withVideo?, maxWidth, maxHeight, quality}` | later: `[path]` |
//! | `pickVideos` | `{quantity?}` | later: `[path]` |
//! | `compressImages` | `{maxWidth, maxHeight, quality, imgPaths}` | `[path]` |
//! | `deleteAllTempFiles` | `{}` | `bool` |
//! | `checkPermission` | `{}` | `bool` |
//! | `requestPermission` | `{}` | later: `bool` |

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use thiserror::Error;

/// Name of the channel the host binds this plugin to.
pub const CHANNEL_NAME: &str = "media_picker";

/// Error code sent when a call's arguments cannot be decoded.
pub const INVALID_ARGUMENTS: &str = "invalid-arguments";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    PickImages,
    PickVideos,
    CompressImages,
    DeleteAllTempFiles,
    CheckPermission,
    RequestPermission,
}

impl Method {
    pub const ALL: [Method; 6] = [
        Method::PickImages,
        Method::PickVideos,
        Method::CompressImages,
        Method::DeleteAllTempFiles,
        Method::CheckPermission,
        Method::RequestPermission,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Method::PickImages => "pickImages",
            Method::PickVideos => "pickVideos",
            Method::CompressImages => "compressImages",
            Method::DeleteAllTempFiles => "deleteAllTempFiles",
            Method::CheckPermission => "checkPermission",
            Method::RequestPermission => "requestPermission",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// Identifier correlating an asynchronous request with its platform callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Invalid arguments for {method}: {source}")]
    InvalidArguments {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

impl BridgeError {
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::InvalidArguments { .. } => INVALID_ARGUMENTS,
        }
    }
}

/// One incoming call.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Decode the arguments into a typed struct. A `null` payload decodes
    /// like an empty map, so methods without required arguments accept it.
    pub fn args<T: DeserializeOwned>(&self) -> Result<T, BridgeError> {
        let result = if self.arguments.is_null() {
            T::deserialize(&Value::Object(Default::default()))
        } else {
            T::deserialize(&self.arguments)
        };
        result.map_err(|source| BridgeError::InvalidArguments {
            method: self.method.clone(),
            source,
        })
    }
}

/// Arguments of `pickImages`.
///
/// The bounds are only used when picked images are compressed on delivery.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickImagesArgs {
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub with_video: bool,
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u32,
}

/// Arguments of `pickVideos`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickVideosArgs {
    #[serde(default)]
    pub quantity: i64,
}

/// Arguments of `compressImages`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressImagesArgs {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u32,
    pub img_paths: Vec<String>,
}

/// A reply as it would travel back over the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Success(Value),
    Error {
        code: String,
        message: String,
        details: Option<Value>,
    },
    NotImplemented,
}

/// The reply half of a call. Consumed by the single reply it sends.
pub trait Responder: Send {
    fn success(self: Box<Self>, value: Value);
    fn error(self: Box<Self>, code: &str, message: &str, details: Option<Value>);
    fn not_implemented(self: Box<Self>);
}

/// Responder that forwards replies over an mpsc channel.
pub struct ChannelResponder {
    tx: Sender<Reply>,
}

impl ChannelResponder {
    /// A responder plus the receiving end its reply arrives on.
    pub fn new() -> (Self, Receiver<Reply>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    fn send(self, reply: Reply) {
        // Receiver gone means nobody is waiting for this reply any more
        let _ = self.tx.send(reply);
    }
}

impl Responder for ChannelResponder {
    fn success(self: Box<Self>, value: Value) {
        self.send(Reply::Success(value));
    }

    fn error(self: Box<Self>, code: &str, message: &str, details: Option<Value>) {
        self.send(Reply::Error {
            code: code.to_string(),
            message: message.to_string(),
            details,
        });
    }

    fn not_implemented(self: Box<Self>) {
        self.send(Reply::NotImplemented);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn channel_name_matches_host_binding() {
        assert_eq!(CHANNEL_NAME, "media_picker");
    }

    #[test]
    fn method_names_roundtrip() {
        for method in Method::ALL {
            assert_eq!(Method::from_name(method.name()), Some(method));
        }
        assert_eq!(Method::from_name("pickAudio"), None);
        assert_eq!(Method::from_name("PickImages"), None);
    }

    #[test]
    fn pick_images_args_defaults() {
        let call = MethodCall::new(
            "pickImages",
            json!({"maxWidth": 800, "maxHeight": 600, "quality": 70}),
        );
        let args: PickImagesArgs = call.args().unwrap();
        assert_eq!(args.quantity, 0);
        assert!(!args.with_video);
        assert_eq!((args.max_width, args.max_height, args.quality), (800, 600, 70));
    }

    #[test]
    fn pick_images_args_missing_bounds_is_invalid() {
        let call = MethodCall::new("pickImages", json!({"quantity": 3}));
        let err = call.args::<PickImagesArgs>().unwrap_err();
        assert_eq!(err.code(), INVALID_ARGUMENTS);
        assert!(err.to_string().contains("pickImages"));
    }

    #[test]
    fn pick_videos_accepts_null_arguments() {
        let call = MethodCall::new("pickVideos", Value::Null);
        let args: PickVideosArgs = call.args().unwrap();
        assert_eq!(args.quantity, 0);
    }

    #[test]
    fn compress_images_args_camel_case() {
        let call = MethodCall::new(
            "compressImages",
            json!({"maxWidth": 1, "maxHeight": 2, "quality": 3, "imgPaths": ["/a", "/b"]}),
        );
        let args: CompressImagesArgs = call.args().unwrap();
        assert_eq!(args.img_paths, vec!["/a", "/b"]);
    }

    #[test]
    fn compress_images_args_wrong_type_is_invalid() {
        let call = MethodCall::new(
            "compressImages",
            json!({"maxWidth": "wide", "maxHeight": 2, "quality": 3, "imgPaths": []}),
        );
        assert!(call.args::<CompressImagesArgs>().is_err());
    }

    #[test]
    fn channel_responder_delivers_each_reply_kind() {
        let (responder, rx) = ChannelResponder::new();
        Box::new(responder).success(json!(true));
        assert_eq!(rx.recv().unwrap(), Reply::Success(json!(true)));

        let (responder, rx) = ChannelResponder::new();
        Box::new(responder).error("code", "message", Some(json!({"k": 1})));
        assert_eq!(
            rx.recv().unwrap(),
            Reply::Error {
                code: "code".into(),
                message: "message".into(),
                details: Some(json!({"k": 1})),
            }
        );

        let (responder, rx) = ChannelResponder::new();
        Box::new(responder).not_implemented();
        assert_eq!(rx.recv().unwrap(), Reply::NotImplemented);
    }

    #[test]
    fn channel_responder_survives_dropped_receiver() {
        let (responder, rx) = ChannelResponder::new();
        drop(rx);
        Box::new(responder).success(Value::Null);
    }

    #[test]
    fn request_id_display() {
        assert_eq!(RequestId(7).to_string(), "#7");
    }
}
