use std::fs;

use smbioslib::{SMBiosData, SMBiosString};

use crate::context::Context;

const DMI_TABLE: &str = "/sys/firmware/dmi/tables/DMI";

/// Load the raw SMBIOS table under the context root, if there is one.
pub fn load(ctx: &Context) -> Option<SMBiosData> {
    let path = ctx.path(DMI_TABLE);
    let path_str = path.to_string_lossy();

    match SMBiosData::try_load_from_file(&path_str, None) {
        Ok(data) => Some(data),
        Err(_) => {
            // Some kernels expose the table without an entry point
            let table_data = fs::read(&path).ok()?;
            Some(SMBiosData::from_vec_and_version(table_data, None))
        }
    }
}

/// Firmware placeholder strings that carry no information.
pub fn is_placeholder(s: &str) -> bool {
    matches!(
        s.trim(),
        "" | "Not Specified"
            | "Not Available"
            | "To Be Filled By O.E.M."
            | "To be filled by O.E.M."
            | "Default string"
            | "None"
    )
}

/// SMBIOS string with placeholders filtered out.
pub fn text(s: SMBiosString) -> Option<String> {
    s.to_utf8_lossy()
        .map(|s| s.trim().to_string())
        .filter(|s| !is_placeholder(s))
}
