//! OSC argument codec
//!
//! Every catalog message maps to one OSC message with a fixed address and a
//! positional argument list. Decoding walks the arguments with an
//! [`ArgReader`]; any type or arity mismatch yields `None`, so a message is
//! either fully built or not built at all.

use rosc::{OscBundle, OscMessage, OscPacket, OscType};

use crate::time::Timetag;

/// Reads typed OSC arguments front to back
#[derive(Debug, Clone)]
pub struct ArgReader<'a> {
    args: &'a [OscType],
    pos: usize,
}

impl<'a> ArgReader<'a> {
    pub fn new(args: &'a [OscType]) -> Self {
        Self { args, pos: 0 }
    }

    fn next_arg(&mut self) -> Option<&'a OscType> {
        let arg = self.args.get(self.pos)?;
        self.pos += 1;
        Some(arg)
    }

    pub fn int(&mut self) -> Option<i32> {
        match self.args.get(self.pos)? {
            OscType::Int(v) => {
                self.pos += 1;
                Some(*v)
            }
            _ => None,
        }
    }

    /// An `int32` reinterpreted as unsigned
    pub fn uint(&mut self) -> Option<u32> {
        self.int().map(|v| v as u32)
    }

    pub fn float(&mut self) -> Option<f32> {
        match self.args.get(self.pos)? {
            OscType::Float(v) => {
                self.pos += 1;
                Some(*v)
            }
            _ => None,
        }
    }

    pub fn string(&mut self) -> Option<&'a str> {
        match self.args.get(self.pos)? {
            OscType::String(s) => {
                self.pos += 1;
                Some(s.as_str())
            }
            _ => None,
        }
    }

    pub fn blob(&mut self) -> Option<&'a [u8]> {
        match self.args.get(self.pos)? {
            OscType::Blob(b) => {
                self.pos += 1;
                Some(b.as_slice())
            }
            _ => None,
        }
    }

    pub fn time(&mut self) -> Option<Timetag> {
        match self.args.get(self.pos)? {
            OscType::Time(t) => {
                self.pos += 1;
                Some((*t).into())
            }
            _ => None,
        }
    }

    pub fn bool(&mut self) -> Option<bool> {
        match self.args.get(self.pos)? {
            OscType::Bool(b) => {
                self.pos += 1;
                Some(*b)
            }
            _ => None,
        }
    }

    /// Consume a `true` separator if one is next
    pub fn separator(&mut self) -> bool {
        if matches!(self.args.get(self.pos), Some(OscType::Bool(true))) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Read `count` floats
    pub fn floats(&mut self, count: usize) -> Option<Vec<f32>> {
        (0..count).map(|_| self.float()).collect()
    }

    /// Read ints until the arguments run out
    pub fn rest_uints(&mut self) -> Option<Vec<u32>> {
        let mut values = Vec::with_capacity(self.remaining());
        while !self.is_empty() {
            values.push(self.uint()?);
        }
        Some(values)
    }

    /// Read floats until the arguments run out
    pub fn rest_floats(&mut self) -> Option<Vec<f32>> {
        let mut values = Vec::with_capacity(self.remaining());
        while !self.is_empty() {
            values.push(self.float()?);
        }
        Some(values)
    }

    /// Skip one argument of any type
    pub fn skip(&mut self) -> Option<&'a OscType> {
        self.next_arg()
    }

    pub fn remaining(&self) -> usize {
        self.args.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// `Some(())` only if every argument was consumed
    pub fn finish(&self) -> Option<()> {
        self.is_empty().then_some(())
    }
}

/// OSC typetag character for one argument
pub fn type_char(arg: &OscType) -> char {
    match arg {
        OscType::Int(_) => 'i',
        OscType::Float(_) => 'f',
        OscType::String(_) => 's',
        OscType::Blob(_) => 'b',
        OscType::Time(_) => 't',
        OscType::Long(_) => 'h',
        OscType::Double(_) => 'd',
        OscType::Char(_) => 'c',
        OscType::Color(_) => 'r',
        OscType::Midi(_) => 'm',
        OscType::Bool(true) => 'T',
        OscType::Bool(false) => 'F',
        OscType::Array(_) => '[',
        OscType::Nil => 'N',
        OscType::Inf => 'I',
    }
}

/// Typetag string of an argument list, without the leading comma
pub fn typetag(args: &[OscType]) -> String {
    args.iter().map(type_char).collect()
}

/// Session ids and other identifiers travel as `int32`
#[inline]
pub fn uint_arg(value: u32) -> OscType {
    OscType::Int(value as i32)
}

/// Bit-exact OSC mapping of one catalog message
pub trait OscCodec: Sized {
    /// OSC address of this message type
    const PATH: &'static str;

    /// Positional arguments in wire order
    fn to_args(&self) -> Vec<OscType>;

    /// Build from positional arguments; `None` on any shape mismatch
    fn from_args(args: &[OscType]) -> Option<Self>;

    fn to_osc(&self) -> OscMessage {
        OscMessage {
            addr: Self::PATH.to_string(),
            args: self.to_args(),
        }
    }

    /// Append this message to an outbound wire bundle
    fn imprint(&self, target: &mut OscBundle) {
        target.content.push(OscPacket::Message(self.to_osc()));
    }

    /// Decode a wire message, checking the address first
    fn parse(msg: &OscMessage) -> Option<Self> {
        if msg.addr != Self::PATH {
            return None;
        }
        Self::from_args(&msg.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_exact_shape() {
        let args = vec![OscType::Int(3), OscType::Float(0.5), OscType::String("a".into())];
        let mut r = ArgReader::new(&args);
        assert_eq!(r.int(), Some(3));
        assert_eq!(r.float(), Some(0.5));
        assert!(r.finish().is_none());
        assert_eq!(r.string(), Some("a"));
        assert!(r.finish().is_some());
    }

    #[test]
    fn test_reader_type_mismatch_does_not_advance() {
        let args = vec![OscType::Float(1.0)];
        let mut r = ArgReader::new(&args);
        assert_eq!(r.int(), None);
        assert_eq!(r.remaining(), 1);
        assert!(!r.separator());
    }

    #[test]
    fn test_typetag() {
        let args = vec![
            OscType::Int(1),
            OscType::Bool(true),
            OscType::Bool(false),
            OscType::Blob(vec![1]),
        ];
        assert_eq!(typetag(&args), "iTFb");
    }

    #[test]
    fn test_rest_uints_rejects_mixed() {
        let args = vec![OscType::Int(1), OscType::Float(2.0)];
        assert!(ArgReader::new(&args).rest_uints().is_none());
    }
}
