use super::ParseError;

/// DNSSEC OK bit in the EDNS flags word (RFC 3225)
const DO_FLAG: u16 = 0x8000;

/// EDNS0 OPT pseudo-record implementation
/// RFC 6891: https://tools.ietf.org/html/rfc6891
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdnsOpt {
    /// UDP payload size that can be handled by the requestor
    pub udp_payload_size: u16,
    /// Extended RCODE (high 8 bits)
    pub extended_rcode: u8,
    /// EDNS version (currently 0)
    pub version: u8,
    /// EDNS flags (16 bits)
    pub flags: u16,
    /// Variable length RDATA containing EDNS options
    pub options: Vec<EdnsOption>,
}

/// EDNS option structure
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdnsOption {
    pub code: u16,
    pub data: Vec<u8>,
}

impl EdnsOpt {
    /// Create a new EDNS OPT record with default values
    pub fn new() -> Self {
        Self {
            udp_payload_size: 4096,
            extended_rcode: 0,
            version: 0,
            flags: 0,
            options: Vec::new(),
        }
    }

    /// Create an EDNS OPT record with specified UDP payload size
    pub fn with_payload_size(payload_size: u16) -> Self {
        Self {
            udp_payload_size: payload_size,
            ..Self::new()
        }
    }

    /// Check if DNSSEC OK (DO) flag is set
    pub fn do_flag(&self) -> bool {
        (self.flags & DO_FLAG) != 0
    }

    /// Set the DNSSEC OK (DO) flag
    pub fn set_do_flag(&mut self, value: bool) {
        if value {
            self.flags |= DO_FLAG;
        } else {
            self.flags &= !DO_FLAG;
        }
    }

    pub fn payload_size(&self) -> u16 {
        self.udp_payload_size
    }

    /// Parse EDNS OPT record from DNS resource record data
    /// The OPT record uses the following format:
    /// - NAME: Root domain (empty)
    /// - TYPE: OPT (41)
    /// - CLASS: UDP payload size (16 bits)
    /// - TTL: Extended RCODE (8 bits) | Version (8 bits) | Flags (16 bits)
    /// - RDLENGTH: Length of option data
    /// - RDATA: Option data
    pub fn parse_from_resource(class: u16, ttl: u32, rdata: &[u8]) -> Result<Self, ParseError> {
        let extended_rcode = ((ttl >> 24) & 0xFF) as u8;
        let version = ((ttl >> 16) & 0xFF) as u8;
        let flags = (ttl & 0xFFFF) as u16;

        let mut options = Vec::new();
        let mut pos = 0;

        while pos + 4 <= rdata.len() {
            let code = u16::from_be_bytes([rdata[pos], rdata[pos + 1]]);
            let length = u16::from_be_bytes([rdata[pos + 2], rdata[pos + 3]]) as usize;
            pos += 4;

            let data = rdata
                .get(pos..pos + length)
                .ok_or_else(|| ParseError::InvalidRdata(format!("EDNS option {} overruns RDATA", code)))?;
            pos += length;

            options.push(EdnsOption {
                code,
                data: data.to_vec(),
            });
        }

        Ok(EdnsOpt {
            udp_payload_size: class,
            extended_rcode,
            version,
            flags,
            options,
        })
    }

    /// Serialize to the (CLASS, TTL, RDATA) triple carried by the OPT record
    pub fn to_resource_format(&self) -> (u16, u32, Vec<u8>) {
        let class = self.udp_payload_size;
        let ttl = ((self.extended_rcode as u32) << 24)
            | ((self.version as u32) << 16)
            | (self.flags as u32);

        let mut rdata = Vec::new();
        for option in &self.options {
            rdata.extend_from_slice(&option.code.to_be_bytes());
            rdata.extend_from_slice(&(option.data.len() as u16).to_be_bytes());
            rdata.extend_from_slice(&option.data);
        }

        (class, ttl, rdata)
    }

    pub fn debug_info(&self) -> String {
        format!(
            "EDNS0: payload_size={}, version={}, flags=0x{:04x}{}, options={}",
            self.udp_payload_size,
            self.version,
            self.flags,
            if self.do_flag() { " (DO)" } else { "" },
            self.options.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edns_opt_creation() {
        let opt = EdnsOpt::new();
        assert_eq!(opt.udp_payload_size, 4096);
        assert_eq!(opt.version, 0);
        assert_eq!(opt.extended_rcode, 0);
        assert_eq!(opt.flags, 0);
        assert!(!opt.do_flag());
    }

    #[test]
    fn test_do_flag() {
        let mut opt = EdnsOpt::new();
        assert!(!opt.do_flag());

        opt.set_do_flag(true);
        assert!(opt.do_flag());
        assert_eq!(opt.flags & 0x8000, 0x8000);

        opt.set_do_flag(false);
        assert!(!opt.do_flag());
        assert_eq!(opt.flags & 0x8000, 0);
    }

    #[test]
    fn test_resource_format_conversion() {
        let mut opt = EdnsOpt::with_payload_size(1232);
        opt.set_do_flag(true);
        opt.options.push(EdnsOption {
            code: 3,
            data: vec![0x01, 0x02, 0x03],
        });

        let (class, ttl, rdata) = opt.to_resource_format();

        assert_eq!(class, 1232);
        assert_eq!(ttl & 0xFFFF, 0x8000);
        assert_eq!(rdata, vec![0x00, 0x03, 0x00, 0x03, 0x01, 0x02, 0x03]);

        let parsed = EdnsOpt::parse_from_resource(class, ttl, &rdata).unwrap();
        assert_eq!(parsed, opt);
    }

    #[test]
    fn test_overrunning_option_is_rejected() {
        let rdata = [0x00, 0x0A, 0x00, 0x08, 0x01];
        assert!(EdnsOpt::parse_from_resource(4096, 0, &rdata).is_err());
    }
}
