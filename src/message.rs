//! Marshaled message bodies.
//!
//! A [`Message`] is a body in the D-Bus wire layout, little-endian, along
//! with the signature of the arguments it holds. It is how a sequence of
//! [`WireArg`]s is handed to or received from a transport that deals in
//! bytes.

use byteorder::LittleEndian;
use log::debug;

use crate::arg::WireArg;
use crate::error::Result;
use crate::policy::{CodecPolicy, DefaultCodecPolicy};
use crate::signature::tokenize_all;

mod reader;
mod writer;

use reader::MessageReader;
use writer::MessageWriter;

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub data: Vec<u8>,
    pub signature: String,
}

impl Message {
    /// Marshals `args` one after another into a single body.
    pub fn from_args(args: &[WireArg]) -> Result<Message> {
        let mut writer = MessageWriter::new();
        let mut signature = String::new();
        for arg in args {
            writer.write_arg(arg)?;
            signature.push_str(&arg.signature());
        }
        let data = writer.complete();
        debug!("marshaled {} args as {:?}, {} bytes", args.len(), signature, data.len());
        Ok(Message { data, signature })
    }

    pub fn to_args(&self) -> Result<Vec<WireArg>> {
        self.to_args_with_policy(DefaultCodecPolicy)
    }

    /// Unmarshals the body according to its signature. Every byte of the
    /// body must belong to an argument.
    pub fn to_args_with_policy(&self, policy: impl CodecPolicy) -> Result<Vec<WireArg>> {
        let mut reader = MessageReader::<LittleEndian>::new(&self.data, policy.max_depth());
        let args = tokenize_all(&self.signature)?
            .into_iter()
            .map(|sig| reader.read_arg(sig, 0))
            .collect::<Result<Vec<_>>>()?;
        reader.complete()?;
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::Message;
    use crate::arg::WireArg;
    use crate::de::decode;
    use crate::error::{Error, Result};
    use crate::policy::DepthLimitPolicy;
    use crate::ser::encode;
    use crate::value::Value;
    use test_log::test;

    fn string(s: &str) -> WireArg {
        WireArg::Str(s.to_owned())
    }

    fn round_trip(args: Vec<WireArg>) -> Result<()> {
        let message = Message::from_args(&args)?;
        assert_eq!(message.to_args()?, args);
        Ok(())
    }

    #[test]
    fn int() -> Result<()> {
        let message = Message::from_args(&[WireArg::Int32(37)])?;
        let correct_message = Message {
            data: vec![37, 0, 0, 0],
            signature: "i".to_owned(),
        };
        assert_eq!(correct_message, message, "i32 message marshaled incorrectly");
        Ok(())
    }

    #[test]
    fn variant() -> Result<()> {
        let message = Message::from_args(&[WireArg::variant(WireArg::Int32(37))])?;
        assert_eq!(message.data, vec![1, 105, 0, 0, 37, 0, 0, 0]);
        assert_eq!(message.signature, "v");
        Ok(())
    }

    #[test]
    fn int_array() -> Result<()> {
        let ints = (1..=4).map(WireArg::Int32).collect();
        let message = Message::from_args(&[WireArg::array("i", ints)?])?;
        assert_eq!(
            message.data,
            vec![16, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4, 0, 0, 0]
        );
        assert_eq!(message.signature, "ai");
        Ok(())
    }

    #[test]
    fn nested_struct() -> Result<()> {
        let arg = WireArg::Struct(vec![
            string("Hi"),
            WireArg::Double(0.2),
            WireArg::Struct(vec![string("Hello"), WireArg::Double(8.3)]),
        ]);
        let message = Message::from_args(&[arg])?;
        let correct_message = Message {
            data: vec![
                2u8, 0u8, 0u8, 0u8, 72u8, 105u8, 0u8, 0u8, 154u8, 153u8, 153u8, 153u8, 153u8,
                153u8, 201u8, 63u8, 5u8, 0u8, 0u8, 0u8, 72u8, 101u8, 108u8, 108u8, 111u8, 0u8, 0u8,
                0u8, 0u8, 0u8, 0u8, 0u8, 154u8, 153u8, 153u8, 153u8, 153u8, 153u8, 32u8, 64u8,
            ],
            signature: "(sd(sd))".to_owned(),
        };
        assert_eq!(correct_message, message, "struct message marshaled incorrectly");
        Ok(())
    }

    #[test]
    fn property_dictionary() -> Result<()> {
        let value = Value::Dict(vec![
            (Value::from("a"), Value::from("Hi")),
            (Value::from("b"), Value::from(0.2)),
        ]);
        let message = Message::from_args(&[encode(&value, "a{sv}")?])?;
        let correct_message = Message {
            data: vec![
                48, 0, 0, 0, // 48 bytes of array
                0, 0, 0, 0, // pad to 8 to start kv pair
                // 48 bytes start here
                1, 0, 0, 0, // key string is 1 byte
                97, 0, // 'a' with terminating null
                1, // value signature is 1 byte
                115, 0, // 's' for string with terminating null
                0, 0, 0, // padding to begin string length
                2, 0, 0, 0, // string in question is 2 bytes
                72, 105, 0, // "Hi" plus terminating null
                0, 0, 0, 0, 0, // pad to 8 to start kv pair
                1, 0, 0, 0, // key string is 1 byte
                98, 0, // 'b' with terminating null
                1, // signature is 1 byte
                100, 0, // 'd' with terminating null
                0, 0, 0, 0, 0, 0, 0, // pad to 8 for double value
                154, 153, 153, 153, 153, 153, 201, 63, // 0.2
            ],
            signature: "a{sv}".to_owned(),
        };
        assert_eq!(correct_message, message, "dict message marshaled incorrectly");

        let args = message.to_args()?;
        assert_eq!(
            decode(&args[0], "a{sv}")?,
            Value::Dict(vec![
                (Value::from("a"), Value::variant(Value::from("Hi"), "s")),
                (Value::from("b"), Value::variant(Value::from(0.2), "d")),
            ])
        );
        Ok(())
    }

    #[test]
    fn multiple_args_round_trip() -> Result<()> {
        round_trip(vec![
            WireArg::Byte(7),
            WireArg::Uint64(1 << 40),
            WireArg::Signature("a{sv}".to_owned()),
            WireArg::ObjectPath("/org/example".to_owned()),
            WireArg::array("y", Vec::new())?,
            WireArg::Bool(false),
            WireArg::array(
                "(ib)",
                vec![
                    WireArg::Struct(vec![WireArg::Int32(-1), WireArg::Bool(true)]),
                    WireArg::Struct(vec![WireArg::Int32(2), WireArg::Bool(false)]),
                ],
            )?,
            WireArg::variant(WireArg::variant(WireArg::Int16(-3))),
        ])
    }

    #[test]
    fn nested_containers_round_trip() -> Result<()> {
        let inner = WireArg::array(
            "{sv}",
            vec![WireArg::dict_entry(
                string("k"),
                WireArg::variant(WireArg::array("d", vec![WireArg::Double(1.5)])?),
            )],
        )?;
        round_trip(vec![
            WireArg::array("a{sv}", vec![inner.clone(), inner])?,
            WireArg::array("as", vec![string("x"), string("")])?,
        ])
    }

    #[test]
    fn empty_body() -> Result<()> {
        round_trip(Vec::new())
    }

    #[test]
    fn malformed_signature() {
        let message = Message {
            data: vec![37, 0, 0, 0],
            signature: "a{".to_owned(),
        };
        assert!(message.to_args().unwrap_err().is_malformed_signature());
    }

    #[test]
    fn leftover_data() {
        let message = Message {
            data: vec![37, 0, 0, 0, 0],
            signature: "i".to_owned(),
        };
        assert_eq!(message.to_args(), Err(Error::LeftoverData(1)));
    }

    #[test]
    fn depth_policy() -> Result<()> {
        let message = Message::from_args(&[WireArg::Struct(vec![WireArg::Struct(vec![
            WireArg::Byte(1),
        ])])])?;
        assert!(message.to_args_with_policy(DepthLimitPolicy(2)).is_ok());
        assert_eq!(
            message.to_args_with_policy(DepthLimitPolicy(1)),
            Err(Error::DepthExceeded(1))
        );
        Ok(())
    }
}
