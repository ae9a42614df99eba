use super::ParseError;

/// NSEC3PARAM RDATA (RFC 5155 section 4.2)
///
/// ```text
///  Hash Alg. | Flags | Iterations (16) | Salt Length | Salt
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Nsec3ParamData {
    pub algorithm: u8,
    pub flags: u8,
    pub iterations: u16,
    pub salt: Vec<u8>,
}

impl Nsec3ParamData {
    pub fn parse(rdata: &[u8]) -> Result<Self, ParseError> {
        if rdata.len() < 5 {
            return Err(ParseError::InvalidRdata(format!(
                "NSEC3PARAM needs at least 5 octets, got {}",
                rdata.len()
            )));
        }

        let algorithm = rdata[0];
        let flags = rdata[1];
        let iterations = u16::from_be_bytes([rdata[2], rdata[3]]);
        let salt_len = rdata[4] as usize;
        let salt = rdata.get(5..5 + salt_len).ok_or_else(|| {
            ParseError::InvalidRdata(format!(
                "NSEC3PARAM salt length {} exceeds remaining {} octets",
                salt_len,
                rdata.len() - 5
            ))
        })?;

        Ok(Self {
            algorithm,
            flags,
            iterations,
            salt: salt.to_vec(),
        })
    }

    pub fn to_rdata(&self) -> Vec<u8> {
        let mut rdata = Vec::with_capacity(5 + self.salt.len());
        rdata.push(self.algorithm);
        rdata.push(self.flags);
        rdata.extend_from_slice(&self.iterations.to_be_bytes());
        rdata.push(self.salt.len() as u8);
        rdata.extend_from_slice(&self.salt);
        rdata
    }
}
