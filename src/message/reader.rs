use std::cmp::Ordering;
use std::marker::PhantomData;
use std::str::from_utf8;

use byteorder::ByteOrder;
use log::{error, trace};

use crate::align::align;
use crate::arg::WireArg;
use crate::error::{Error, Result};
use crate::primitives::code_alignment;
use crate::signature::{dictionary_key_value, expect_single_type, struct_fields};

/// Reads wire arguments back out of a message body, guided by their
/// signatures.
pub(super) struct MessageReader<'de, B: ByteOrder> {
    data: &'de [u8],
    data_ix: usize,
    max_depth: usize,
    phantom: PhantomData<B>,
}

impl<'de, B: ByteOrder> MessageReader<'de, B> {
    pub(super) fn new(data: &'de [u8], max_depth: usize) -> Self {
        Self {
            data,
            data_ix: 0,
            max_depth,
            phantom: PhantomData,
        }
    }

    pub(super) fn complete(self) -> Result<()> {
        let leftover_data = self.data.len() - self.data_ix;
        if leftover_data != 0 {
            return Err(Error::LeftoverData(leftover_data));
        }

        Ok(())
    }

    fn enter(&self, depth: usize) -> Result<usize> {
        if depth >= self.max_depth {
            return Err(Error::DepthExceeded(self.max_depth));
        }
        Ok(depth + 1)
    }

    fn align_reader(&mut self, alignment: usize) -> Result<()> {
        let ix = align(self.data_ix, alignment);
        if ix > self.data.len() {
            error!("Index out of bounds");
            return Err(Error::IndexOutOfBounds(ix));
        }
        self.data_ix = ix;
        Ok(())
    }

    fn read(&mut self, len: usize) -> Result<&'de [u8]> {
        let old_ix = self.data_ix;
        let new_ix = old_ix.saturating_add(len);
        if new_ix > self.data.len() {
            error!("Index out of bounds");
            return Err(Error::IndexOutOfBounds(new_ix));
        }
        self.data_ix = new_ix;
        Ok(&self.data[old_ix..new_ix])
    }

    fn read_aligned(&mut self, len: usize) -> Result<&'de [u8]> {
        self.align_reader(len)?;
        self.read(len)
    }

    fn read_str(&mut self) -> Result<&'de str> {
        let size = B::read_u32(self.read_aligned(4)?) as usize;
        trace!("string of {} bytes at {}", size, self.data_ix);
        let bytes = self.read(size.saturating_add(1))?;
        Ok(from_utf8(&bytes[..size])?)
    }

    fn read_signature(&mut self) -> Result<&'de str> {
        let size = self.read(1)?[0] as usize;
        let bytes = self.read(size + 1)?;
        Ok(from_utf8(&bytes[..size])?)
    }

    /// Reads one argument of the complete type `sig`.
    pub(super) fn read_arg(&mut self, sig: &str, depth: usize) -> Result<WireArg> {
        let code = *sig.as_bytes().first().ok_or(Error::EmptySignature)?;
        trace!("read {:?} at {}", sig, self.data_ix);
        let arg = match code {
            b'y' => WireArg::Byte(self.read(1)?[0]),
            b'b' => match B::read_u32(self.read_aligned(4)?) {
                0 => WireArg::Bool(false),
                1 => WireArg::Bool(true),
                other => return Err(Error::InvalidBoolValue(other)),
            },
            b'n' => WireArg::Int16(B::read_i16(self.read_aligned(2)?)),
            b'q' => WireArg::Uint16(B::read_u16(self.read_aligned(2)?)),
            b'i' => WireArg::Int32(B::read_i32(self.read_aligned(4)?)),
            b'u' => WireArg::Uint32(B::read_u32(self.read_aligned(4)?)),
            b'x' => WireArg::Int64(B::read_i64(self.read_aligned(8)?)),
            b't' => WireArg::Uint64(B::read_u64(self.read_aligned(8)?)),
            b'd' => WireArg::Double(B::read_f64(self.read_aligned(8)?)),
            b's' => WireArg::Str(self.read_str()?.to_owned()),
            b'o' => WireArg::ObjectPath(self.read_str()?.to_owned()),
            b'g' => WireArg::Signature(self.read_signature()?.to_owned()),
            b'v' => {
                let depth = self.enter(depth)?;
                let signature = self.read_signature()?;
                expect_single_type(signature)?;
                let value = self.read_arg(signature, depth)?;
                WireArg::Variant {
                    signature: signature.to_owned(),
                    value: Box::new(value),
                }
            }
            b'(' => {
                let depth = self.enter(depth)?;
                self.align_reader(8)?;
                let members = struct_fields(sig)?
                    .into_iter()
                    .map(|field| self.read_arg(field, depth))
                    .collect::<Result<Vec<_>>>()?;
                WireArg::Struct(members)
            }
            b'a' => self.read_array(sig, depth)?,
            b'{' => return Err(Error::InvalidDictionarySignature(sig.to_owned())),
            other => return Err(Error::UnrecognizedSignatureCharacter(other as char)),
        };
        Ok(arg)
    }

    fn read_array(&mut self, sig: &str, depth: usize) -> Result<WireArg> {
        let depth = self.enter(depth)?;
        let element_sig = &sig[1..];
        let code = *element_sig
            .as_bytes()
            .first()
            .ok_or_else(|| Error::InvalidSignature(sig.to_owned()))?;
        let alignment =
            code_alignment(code).ok_or(Error::UnrecognizedSignatureCharacter(code as char))?;

        let array_size = B::read_u32(self.read_aligned(4)?) as usize;
        self.align_reader(alignment)?;
        let end_ix = self.data_ix.saturating_add(array_size);
        if end_ix > self.data.len() {
            error!("Index out of bounds");
            return Err(Error::IndexOutOfBounds(end_ix));
        }

        let entry_sigs = if code == b'{' {
            Some(dictionary_key_value(sig)?)
        } else {
            None
        };
        let mut elements = Vec::new();
        loop {
            match self.data_ix.cmp(&end_ix) {
                Ordering::Greater => {
                    return Err(Error::ArrayElementOverrun(self.data_ix, end_ix));
                }
                Ordering::Equal => break,
                Ordering::Less => {}
            }
            let element = match entry_sigs {
                Some((key_sig, value_sig)) => {
                    self.align_reader(8)?;
                    let key = self.read_arg(key_sig, depth)?;
                    let value = self.read_arg(value_sig, depth)?;
                    WireArg::dict_entry(key, value)
                }
                None => self.read_arg(element_sig, depth)?,
            };
            elements.push(element);
        }

        Ok(WireArg::Array {
            element_signature: element_sig.to_owned(),
            elements,
        })
    }
}
