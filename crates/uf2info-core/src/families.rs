//! Static lookup data for UF2 family ids.
//!
//! See https://github.com/microsoft/uf2/blob/master/utils/uf2families.json for list

/// Known family ids and their registry names, sorted by id.
const FAMILIES: &[(u32, &str)] = &[
    (0x00ff6919, "ST STM32L4xx"),
    (0x04240bdf, "ST STM32L5xx"),
    (0x06d1097b, "ST STM32F411xC"),
    (0x11de784a, "M0SENSE BL702"),
    (0x16573617, "Microchip (Atmel) ATmega32"),
    (0x1851780a, "Microchip (Atmel) SAML21"),
    (0x1b57745f, "Nordic NRF52"),
    (0x1c5f21b0, "ESP32"),
    (0x1e1f432d, "ST STM32L1xx"),
    (0x202e3a91, "ST STM32L0xx"),
    (0x21460ff0, "ST STM32WLxx"),
    (0x22e0d6fc, "Realtek AmebaZ RTL8710B"),
    (0x2abc77ec, "NXP LPC55xx"),
    (0x2b88d29c, "ESP32-C2"),
    (0x2dc309c5, "ST STM32F411xE"),
    (0x300f5633, "ST STM32G0xx"),
    (0x31d228c6, "GD32F350"),
    (0x332726f6, "ESP32-H2"),
    (0x3379cfe2, "Realtek AmebaD RTL8720D"),
    (0x3d308e94, "ESP32-P4"),
    (0x4b684d71, "Sipeed MaixPlay-U4(BL618)"),
    (0x4c71240a, "ST STM32G4xx"),
    (0x4f6ace52, "LISTENAI CSK300x/400x"),
    (0x4fb2d5bd, "NXP i.MX RT10XX"),
    (0x51e903a8, "Xradiotech 809"),
    (0x53b80f00, "ST STM32F7xx"),
    (0x540ddf62, "ESP32-C6"),
    (0x55114460, "Microchip (Atmel) SAMD51"),
    (0x57755a57, "ST STM32F4xx"),
    (0x5a18069b, "Cypress FX2"),
    (0x5d1a0a2e, "ST STM32F2xx"),
    (0x5ee21072, "ST STM32F103"),
    (0x621e937a, "Nordic NRF52833"),
    (0x647824b6, "ST STM32F0xx"),
    (0x675a40b0, "Beken 7231U/7231T"),
    (0x68ed2b88, "Microchip (Atmel) SAMD21"),
    (0x699b62ec, "WCH CH32V2xx and CH32V3xx"),
    (0x6a82cc42, "Beken 7251/7252"),
    (0x6b846188, "ST STM32F3xx"),
    (0x6d0922fa, "ST STM32F407"),
    (0x6db66082, "ST STM32H7xx"),
    (0x6e7348a8, "LISTENAI CSK60xx"),
    (0x6f752678, "Nordic NRF52832xxAB"),
    (0x70d16653, "ST STM32WBxx"),
    (0x72721d4e, "Nordic NRF52832xxAA"),
    (0x77d850c4, "ESP32-C61"),
    (0x7b3ef230, "Beken 7231N"),
    (0x7be8976d, "Renesas RA4M1"),
    (0x7eab61ed, "ESP8266"),
    (0x7f83e793, "NXP KL32L2x"),
    (0x8fb060fe, "ST STM32F407VG"),
    (0x9517422f, "Renesas RZ/A1LU (R7S7210xx)"),
    (0x9af03e33, "GigaDevice GD32VF103"),
    (0x9fffd543, "Realtek Ameba1 RTL8710A"),
    (0xa0c97b8e, "ArteryTek AT32F415"),
    (0xada52840, "Nordic NRF52840"),
    (0xbfdd4eee, "ESP32-S2"),
    (0xc47e5767, "ESP32-S3"),
    (0xd42ba06c, "ESP32-C3"),
    (0xe08f7564, "Realtek AmebaZ2 RTL8720C"),
    (0xe48bff56, "Raspberry Pi RP2040"),
    (
        0xe48bff57,
        "Raspberry Pi Microcontrollers: Absolute (unpartitioned) download",
    ),
    (
        0xe48bff58,
        "Raspberry Pi Microcontrollers: Data partition download",
    ),
    (0xe48bff59, "Raspberry Pi RP2350, Secure Arm image"),
    (0xe48bff5a, "Raspberry Pi RP2350, RISC-V image"),
    (0xe48bff5b, "Raspberry Pi RP2350, Non-secure Arm image"),
    (0xf71c0343, "ESP32-C5"),
];

/// Resolves a family id to its registry name.
pub fn family_name(id: u32) -> Option<&'static str> {
    FAMILIES
        .binary_search_by_key(&id, |&(id, _)| id)
        .ok()
        .map(|index| FAMILIES[index].1)
}
