use byteorder::{ByteOrder, LittleEndian};
use log::trace;

use crate::align::align;
use crate::arg::WireArg;
use crate::error::{Error, Result};
use crate::primitives::{code_alignment, DbusPrimitive, ObjectPathRef, SignatureRef};

/// Marks the length word of an array whose size is not known yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct LengthToken {
    fill_ix: usize,
    begin_ix: usize,
}

/// Marshals wire arguments into a message body that starts at offset 0, so
/// alignment is always relative to the start of `data`.
pub(super) struct MessageWriter {
    data: Vec<u8>,
}

impl MessageWriter {
    pub(super) fn new() -> Self {
        Self { data: Vec::new() }
    }

    // Note: alignment must be power of 2
    pub(super) fn align(&mut self, alignment: usize) {
        self.data.resize(align(self.data.len(), alignment), 0);
    }

    pub(super) fn prepare_write(&mut self, size: usize) -> &mut [u8] {
        let old_len = self.data.len();
        let new_len = old_len + size;
        self.data.resize(new_len, 0);
        &mut self.data[old_len..new_len]
    }

    fn write_primitive<T: DbusPrimitive>(&mut self, value: &T) {
        self.align(T::alignment());
        trace!("write '{}' at {}", T::signature() as char, self.data.len());
        let out = self.prepare_write(value.size());
        value.serialize(out);
    }

    /// Writes a placeholder array length. The array content starts after
    /// the padding to `element_alignment`, which is not counted in the
    /// length, even when the array turns out to be empty.
    pub(super) fn start_length(&mut self, element_alignment: usize) -> LengthToken {
        self.align(4);
        let fill_ix = self.data.len();
        self.prepare_write(4);
        self.align(element_alignment);
        LengthToken {
            fill_ix,
            begin_ix: self.data.len(),
        }
    }

    pub(super) fn finish_length(&mut self, token: LengthToken) {
        let length = self.data.len() - token.begin_ix;
        LittleEndian::write_u32(
            &mut self.data[token.fill_ix..token.fill_ix + 4],
            length as u32,
        );
    }

    pub(super) fn write_arg(&mut self, arg: &WireArg) -> Result<()> {
        match arg {
            WireArg::Bool(v) => self.write_primitive(v),
            WireArg::Byte(v) => self.write_primitive(v),
            WireArg::Int16(v) => self.write_primitive(v),
            WireArg::Uint16(v) => self.write_primitive(v),
            WireArg::Int32(v) => self.write_primitive(v),
            WireArg::Uint32(v) => self.write_primitive(v),
            WireArg::Int64(v) => self.write_primitive(v),
            WireArg::Uint64(v) => self.write_primitive(v),
            WireArg::Double(v) => self.write_primitive(v),
            WireArg::Str(v) => self.write_primitive(&v.as_str()),
            WireArg::ObjectPath(v) => self.write_primitive(&ObjectPathRef(v)),
            WireArg::Signature(v) => self.write_signature(v)?,
            WireArg::Variant { signature, value } => {
                let found = value.signature();
                if found != *signature {
                    return Err(Error::MismatchSignature(signature.clone(), found));
                }
                self.write_signature(signature)?;
                self.write_arg(value)?;
            }
            WireArg::Struct(members) => {
                self.align(8);
                for member in members {
                    self.write_arg(member)?;
                }
            }
            WireArg::Array {
                element_signature,
                elements,
            } => {
                let code = *element_signature
                    .as_bytes()
                    .first()
                    .ok_or(Error::EmptySignature)?;
                let alignment = code_alignment(code)
                    .ok_or(Error::UnrecognizedSignatureCharacter(code as char))?;
                let token = self.start_length(alignment);
                for element in elements {
                    let found = element.signature();
                    if found != *element_signature {
                        return Err(Error::MismatchSignature(element_signature.clone(), found));
                    }
                    self.write_arg(element)?;
                }
                self.finish_length(token);
            }
            WireArg::DictEntry(key, value) => {
                self.align(8);
                self.write_arg(key)?;
                self.write_arg(value)?;
            }
        }
        Ok(())
    }

    fn write_signature(&mut self, sig: &str) -> Result<()> {
        // The length has to fit its single byte.
        if sig.len() > u8::MAX as usize {
            return Err(Error::InvalidSignature(sig.to_owned()));
        }
        self.write_primitive(&SignatureRef(sig));
        Ok(())
    }

    pub(super) fn complete(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::MessageWriter;
    use crate::arg::WireArg;
    use crate::error::{Error, Result};
    use test_log::test;

    fn written(arg: &WireArg) -> Result<Vec<u8>> {
        let mut writer = MessageWriter::new();
        writer.write_arg(arg)?;
        Ok(writer.complete())
    }

    #[test]
    fn empty_array_still_pads() -> Result<()> {
        let mut writer = MessageWriter::new();
        writer.write_arg(&WireArg::Byte(1))?;
        writer.write_arg(&WireArg::array("x", Vec::new())?)?;
        assert_eq!(writer.complete(), vec![1, 0, 0, 0, 0, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn length_excludes_leading_padding() -> Result<()> {
        let arg = WireArg::array("t", vec![WireArg::Uint64(1)])?;
        assert_eq!(
            written(&arg)?,
            vec![
                8, 0, 0, 0, // 8 bytes of array
                0, 0, 0, 0, // padding(8)
                1, 0, 0, 0, 0, 0, 0, 0,
            ]
        );
        Ok(())
    }

    #[test]
    fn object_path_after_byte() -> Result<()> {
        let mut writer = MessageWriter::new();
        writer.write_arg(&WireArg::Byte(9))?;
        writer.write_arg(&WireArg::ObjectPath("/org".to_owned()))?;
        assert_eq!(
            writer.complete(),
            vec![9, 0, 0, 0, 4, 0, 0, 0, b'/', b'o', b'r', b'g', 0]
        );
        Ok(())
    }

    #[test]
    fn bool_is_four_bytes() -> Result<()> {
        assert_eq!(written(&WireArg::Bool(true))?, vec![1, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn rejects_inconsistent_variant() {
        let arg = WireArg::Variant {
            signature: "s".to_owned(),
            value: Box::new(WireArg::Int32(1)),
        };
        assert_eq!(
            written(&arg),
            Err(Error::MismatchSignature("s".to_owned(), "i".to_owned()))
        );
    }

    #[test]
    fn rejects_overlong_signature() {
        let sig = "i".repeat(256);
        assert_eq!(
            written(&WireArg::Signature(sig.clone())),
            Err(Error::InvalidSignature(sig))
        );
    }
}
