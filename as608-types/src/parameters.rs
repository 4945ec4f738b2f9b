//! Device parameter block
//!
//! The bridge prints the sensor's system parameters as fixed `Key: value`
//! text lines:
//!
//! ```text
//! Status Register: 0x0
//! Sensor Type: 0x0
//! Capacity: 0x12c
//! Security Level: 0x3
//! Device Address: 0xffffffff
//! Data Packet Length: 128
//! Baudrate: 57600
//! ```

use std::fmt;

/// Device parameters as reported by the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceParameters {
    /// Raw lines, verbatim (line terminators included)
    pub lines: Vec<String>,

    pub status_register: Option<u16>,
    pub sensor_type: Option<u16>,

    /// Template library capacity
    pub capacity: Option<u16>,

    pub security_level: Option<u16>,
    pub device_address: Option<u32>,

    /// Data packet payload size in bytes
    pub data_packet_length: Option<u16>,

    pub baud_rate: Option<u32>,
}

impl DeviceParameters {
    /// Build from raw lines; unknown or malformed lines are kept but not parsed
    pub fn from_lines(lines: Vec<String>) -> Self {
        let mut params = Self {
            lines: Vec::new(),
            status_register: None,
            sensor_type: None,
            capacity: None,
            security_level: None,
            device_address: None,
            data_packet_length: None,
            baud_rate: None,
        };

        for line in &lines {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match key.trim() {
                "Status Register" => params.status_register = parse_number(value),
                "Sensor Type" => params.sensor_type = parse_number(value),
                "Capacity" => params.capacity = parse_number(value),
                "Security Level" => params.security_level = parse_number(value),
                "Device Address" => params.device_address = parse_number(value),
                "Data Packet Length" => params.data_packet_length = parse_number(value),
                "Baudrate" => params.baud_rate = parse_number(value),
                _ => {}
            }
        }

        params.lines = lines;
        params
    }

    /// Value text for `key`, if a line carries it
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| {
            let (k, v) = line.split_once(':')?;
            (k.trim() == key).then(|| v.trim())
        })
    }
}

/// Parse `0x`-prefixed hex or plain decimal
fn parse_number<T>(value: &str) -> Option<T>
where
    T: TryFrom<u64>,
{
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok()?,
        None => value.parse::<u64>().ok()?,
    };
    T::try_from(parsed).ok()
}

impl fmt::Display for DeviceParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sensor[")?;
        match self.capacity {
            Some(capacity) => write!(f, "capacity: {}", capacity)?,
            None => write!(f, "capacity: ?")?,
        }
        match self.baud_rate {
            Some(baud) => write!(f, ", baud: {}", baud)?,
            None => write!(f, ", baud: ?")?,
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_lines() -> Vec<String> {
        [
            "Status Register: 0x0\r\n",
            "Sensor Type: 0x0\r\n",
            "Capacity: 0x12c\r\n",
            "Security Level: 0x3\r\n",
            "Device Address: 0xffffffff\r\n",
            "Data Packet Length: 128\r\n",
            "Baudrate: 57600\r\n",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    #[test]
    fn test_parse_parameter_block() {
        let params = DeviceParameters::from_lines(sample_lines());

        assert_eq!(params.status_register, Some(0));
        assert_eq!(params.capacity, Some(300));
        assert_eq!(params.security_level, Some(3));
        assert_eq!(params.device_address, Some(0xFFFF_FFFF));
        assert_eq!(params.data_packet_length, Some(128));
        assert_eq!(params.baud_rate, Some(57600));
        assert_eq!(params.lines.len(), 7);
    }

    #[test]
    fn test_lines_kept_verbatim() {
        let params = DeviceParameters::from_lines(sample_lines());
        assert_eq!(params.lines[2], "Capacity: 0x12c\r\n");
        assert_eq!(params.get("Capacity"), Some("0x12c"));
        assert_eq!(params.get("Missing"), None);
    }

    #[test]
    fn test_malformed_lines_are_ignored() {
        let params = DeviceParameters::from_lines(vec![
            "garbage\n".to_string(),
            "Capacity: lots\n".to_string(),
            "Baudrate: 99999999999\n".to_string(),
        ]);

        assert_eq!(params.capacity, None);
        assert_eq!(params.baud_rate, None);
        assert_eq!(params.lines.len(), 3);
    }

    #[test]
    fn test_display() {
        let params = DeviceParameters::from_lines(sample_lines());
        assert_eq!(params.to_string(), "Sensor[capacity: 300, baud: 57600]");
    }
}
