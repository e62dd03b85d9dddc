//! Control, data, signal and raw sample messages, plus the opaque
//! pass-through used for addresses the catalog does not know.

use std::fmt;

use rosc::{OscMessage, OscType};

use crate::codec::{typetag, uint_arg, ArgReader, OscCodec};
use crate::ids::SessionId;
use crate::messages::traits::impl_session_id;

/// `/tuio2/ctl s_id c0 ... cN`: normalised control values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Control {
    pub session_id: SessionId,
    pub values: Vec<f32>,
}

impl OscCodec for Control {
    const PATH: &'static str = "/tuio2/ctl";

    fn to_args(&self) -> Vec<OscType> {
        let mut args = vec![uint_arg(self.session_id)];
        args.extend(self.values.iter().copied().map(OscType::Float));
        args
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        Some(Self {
            session_id: r.uint()?,
            values: r.rest_floats()?,
        })
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} s_id={} {:?}", Self::PATH, self.session_id, self.values)
    }
}

/// Body of a data message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataPayload {
    Text(String),
    Binary(Vec<u8>),
}

impl Default for DataPayload {
    fn default() -> Self {
        DataPayload::Text(String::new())
    }
}

/// `/tuio2/dat s_id mime data`: data is a string or a blob
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Data {
    pub session_id: SessionId,
    pub mime: String,
    pub payload: DataPayload,
}

impl OscCodec for Data {
    const PATH: &'static str = "/tuio2/dat";

    fn to_args(&self) -> Vec<OscType> {
        let body = match &self.payload {
            DataPayload::Text(s) => OscType::String(s.clone()),
            DataPayload::Binary(b) => OscType::Blob(b.clone()),
        };
        vec![
            uint_arg(self.session_id),
            OscType::String(self.mime.clone()),
            body,
        ]
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        let session_id = r.uint()?;
        let mime = r.string()?.to_string();
        let payload = match r.skip()? {
            OscType::String(s) => DataPayload::Text(s.clone()),
            OscType::Blob(b) => DataPayload::Binary(b.clone()),
            _ => return None,
        };
        r.finish()?;
        Some(Self {
            session_id,
            mime,
            payload,
        })
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            DataPayload::Text(s) => write!(
                f,
                "{} s_id={} mime={} text={:?}",
                Self::PATH,
                self.session_id,
                self.mime,
                s
            ),
            DataPayload::Binary(b) => write!(
                f,
                "{} s_id={} mime={} blob[{}]",
                Self::PATH,
                self.session_id,
                self.mime,
                b.len()
            ),
        }
    }
}

/// `/tuio2/sig s_id c_id t_id0 ... t_idN`: a trigger sent to target sessions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signal {
    pub session_id: SessionId,
    pub component_id: u32,
    pub targets: Vec<SessionId>,
}

impl OscCodec for Signal {
    const PATH: &'static str = "/tuio2/sig";

    fn to_args(&self) -> Vec<OscType> {
        let mut args = vec![uint_arg(self.session_id), uint_arg(self.component_id)];
        args.extend(self.targets.iter().map(|t| uint_arg(*t)));
        args
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        Some(Self {
            session_id: r.uint()?,
            component_id: r.uint()?,
            targets: r.rest_uints()?,
        })
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} s_id={} c_id={} targets={:?}",
            Self::PATH,
            self.session_id,
            self.component_id,
            self.targets
        )
    }
}

/// `/tuio2/raw s_id width data`: raw sensor samples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Raw {
    pub session_id: SessionId,
    /// Sample spacing in normalised units
    pub sample_width: f32,
    pub samples: Vec<u8>,
}

impl OscCodec for Raw {
    const PATH: &'static str = "/tuio2/raw";

    fn to_args(&self) -> Vec<OscType> {
        vec![
            uint_arg(self.session_id),
            OscType::Float(self.sample_width),
            OscType::Blob(self.samples.clone()),
        ]
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        let msg = Self {
            session_id: r.uint()?,
            sample_width: r.float()?,
            samples: r.blob()?.to_vec(),
        };
        r.finish()?;
        Some(msg)
    }
}

impl fmt::Display for Raw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} s_id={} width={} samples[{}]",
            Self::PATH,
            self.session_id,
            self.sample_width,
            self.samples.len()
        )
    }
}

impl_session_id!(Control, Data, Signal, Raw);

/// Any OSC message kept verbatim for lossless forwarding
#[derive(Debug, Clone, PartialEq)]
pub struct GenericMessage {
    pub path: String,
    pub args: Vec<OscType>,
}

impl GenericMessage {
    pub fn from_osc(msg: &OscMessage) -> Self {
        Self {
            path: msg.addr.clone(),
            args: msg.args.clone(),
        }
    }

    pub fn to_osc(&self) -> OscMessage {
        OscMessage {
            addr: self.path.clone(),
            args: self.args.clone(),
        }
    }

    pub fn typetag(&self) -> String {
        typetag(&self.args)
    }
}

impl fmt::Display for GenericMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ,{}", self.path, self.typetag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_text_and_blob() {
        let text = Data {
            session_id: 2,
            mime: "text/plain".into(),
            payload: DataPayload::Text("hello".into()),
        };
        assert_eq!(Data::parse(&text.to_osc()), Some(text));

        let blob = Data {
            session_id: 2,
            mime: "application/octet-stream".into(),
            payload: DataPayload::Binary(vec![0, 1, 2]),
        };
        assert_eq!(Data::parse(&blob.to_osc()), Some(blob));
    }

    #[test]
    fn test_data_rejects_numeric_body() {
        let args = vec![OscType::Int(1), OscType::String("x".into()), OscType::Int(3)];
        assert!(Data::from_args(&args).is_none());
    }

    #[test]
    fn test_control_values() {
        let ctl = Control {
            session_id: 8,
            values: vec![0.0, -1.0, 1.0],
        };
        let msg = ctl.to_osc();
        assert_eq!(typetag(&msg.args), "ifff");
        assert_eq!(Control::parse(&msg), Some(ctl));
    }

    #[test]
    fn test_generic_keeps_arguments() {
        let osc = OscMessage {
            addr: "/vendor/thing".into(),
            args: vec![OscType::Int(4), OscType::Nil],
        };
        let generic = GenericMessage::from_osc(&osc);
        assert_eq!(generic.to_osc(), osc);
        assert_eq!(generic.to_string(), "/vendor/thing ,iN");
    }
}
