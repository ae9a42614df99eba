use bitstream_io::{BitRead, BitReader, BitWrite, BitWriter, Endianness};

use super::{
    ParseError,
    common::PacketComponent,
    enums::{DNSResourceClass, DNSResourceType},
    rdata::Nsec3ParamData,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DNSResource {
    pub labels: Vec<String>,
    pub rtype: DNSResourceType,
    pub rclass: DNSResourceClass,
    pub ttl: u32,
    pub rdlength: u16,
    /// Uninterpreted RDATA; typed views are decoded on demand
    pub rdata: Vec<u8>,
}

impl DNSResource {
    /// Build an NSEC3PARAM record for `labels`.
    pub fn nsec3param(labels: Vec<String>, ttl: u32, data: &Nsec3ParamData) -> Self {
        let rdata = data.to_rdata();
        Self {
            labels,
            rtype: DNSResourceType::NSEC3PARAM,
            rclass: DNSResourceClass::IN,
            ttl,
            rdlength: rdata.len() as u16,
            rdata,
        }
    }

    /// Decode the RDATA as NSEC3PARAM, or `None` for any other record type.
    pub fn as_nsec3param(&self) -> Option<Result<Nsec3ParamData, ParseError>> {
        (self.rtype == DNSResourceType::NSEC3PARAM).then(|| Nsec3ParamData::parse(&self.rdata))
    }

    fn read_fixed_fields<E: Endianness>(
        &mut self,
        reader: &mut BitReader<&[u8], E>,
    ) -> Result<(), ParseError> {
        self.rtype = reader.read_var::<u16>(16)?.into();
        self.rclass = reader.read_var::<u16>(16)?.into();
        self.ttl = reader.read_var::<u32>(32)?;
        self.rdlength = reader.read_var::<u16>(16)?;
        let mut buf = vec![0_u8; self.rdlength as usize];
        reader.read_bytes(&mut buf)?;
        self.rdata = buf;
        Ok(())
    }
}

impl PacketComponent for DNSResource {
    fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError> {
        self.write_labels(writer, &self.labels)?;
        writer.write_var::<u16>(16, self.rtype.into())?;
        writer.write_var::<u16>(16, self.rclass.into())?;
        writer.write_var::<u32>(32, self.ttl)?;
        writer.write_var::<u16>(16, self.rdata.len() as u16)?;
        writer.write_bytes(&self.rdata)?;
        Ok(())
    }

    fn read<E: Endianness>(&mut self, reader: &mut BitReader<&[u8], E>) -> Result<(), ParseError> {
        self.labels = self.read_labels(reader)?;
        self.read_fixed_fields(reader)
    }

    fn read_with_buffer<E: Endianness>(
        &mut self,
        reader: &mut BitReader<&[u8], E>,
        packet_buf: &[u8],
    ) -> Result<(), ParseError> {
        self.labels = self.read_labels_with_buffer(reader, Some(packet_buf))?;
        self.read_fixed_fields(reader)
    }
}
