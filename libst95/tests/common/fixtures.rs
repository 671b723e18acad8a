// fixtures.rs: chip replies for a MIFARE Ultralight session over UART

/// IDN reply of a CR95HF: "NFC FS2JAST4", ROM CRC 0x2ACE.
pub fn idn_frame() -> Vec<u8> {
    hex::decode("000f4e4643204653324a41535434002ace").unwrap()
}

/// PROTOCOL acknowledgement.
pub fn protocol_ack() -> Vec<u8> {
    hex::decode("0000").unwrap()
}

/// WRITE_REG acknowledgement.
pub fn write_reg_ack() -> Vec<u8> {
    hex::decode("0000").unwrap()
}

/// "No tag in the field" SEND_RECV reply.
pub fn no_tag() -> Vec<u8> {
    hex::decode("8700").unwrap()
}

/// SEND_RECV reply with a framing receive error.
pub fn rx_framing_error() -> Vec<u8> {
    hex::decode("8800").unwrap()
}

/// REQA answer of a MIFARE Ultralight (double-size UID).
pub fn ultralight_atqa() -> Vec<u8> {
    hex::decode("80054400280000").unwrap()
}

/// Level 1 ANTICOL answer: cascade tag 88 04 2b 6a, BCC.
pub fn ultralight_cl1() -> Vec<u8> {
    hex::decode("800888042b6acd280000").unwrap()
}

/// Level 1 SELECT answer: SAK 0x04 (UID not complete).
pub fn ultralight_sak1() -> Vec<u8> {
    hex::decode("800604dac8080000").unwrap()
}

/// Level 2 ANTICOL answer: 2a 2f 5a 80, BCC.
pub fn ultralight_cl2() -> Vec<u8> {
    hex::decode("80082a2f5a80df280000").unwrap()
}

/// Level 2 SELECT answer: SAK 0x00.
pub fn ultralight_sak2() -> Vec<u8> {
    hex::decode("800600fe51080000").unwrap()
}

/// UID resolved from the Ultralight frames above.
pub fn ultralight_uid() -> Vec<u8> {
    hex::decode("042b6a2a2f5a80").unwrap()
}

/// Full reply sequence for one Ultralight acquisition after field on.
pub fn ultralight_session() -> Vec<Vec<u8>> {
    vec![
        ultralight_atqa(),
        ultralight_cl1(),
        ultralight_sak1(),
        ultralight_cl2(),
        ultralight_sak2(),
    ]
}
