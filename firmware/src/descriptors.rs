//! USB descriptors for a boot-protocol keyboard.

/// Control endpoint size.
pub const EP0_SIZE: u8 = 32;
/// Interrupt IN endpoint size (one keyboard report).
pub const KEYBOARD_EP_SIZE: u8 = 8;
/// Endpoint number used for keyboard reports.
pub const KEYBOARD_EP: u8 = 3;

const DESC_DEVICE: u8 = 1;
const DESC_CONFIGURATION: u8 = 2;
const DESC_STRING: u8 = 3;
const DESC_HID: u8 = 0x21;
const DESC_HID_REPORT: u8 = 0x22;

/// Boot keyboard report: modifiers, reserved byte, 5 LED bits out, 6 keys.
static REPORT_DESCRIPTOR: [u8; 63] = [
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x05, 0x07, //   Usage Page (Key Codes)
    0x19, 0xE0, //   Usage Minimum (224)
    0x29, 0xE7, //   Usage Maximum (231)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute) - modifier byte
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x03, //   Input (Constant) - reserved byte
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (1)
    0x29, 0x05, //   Usage Maximum (5)
    0x91, 0x02, //   Output (Data, Variable, Absolute) - LED report
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x91, 0x03, //   Output (Constant) - LED padding
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x68, //   Logical Maximum (104)
    0x05, 0x07, //   Usage Page (Key Codes)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0x68, //   Usage Maximum (104)
    0x81, 0x00, //   Input (Data, Array) - key slots
    0xC0,       // End Collection
];

static DEVICE: [u8; 18] = [
    18,          // bLength
    DESC_DEVICE, // bDescriptorType
    0x00, 0x02,  // bcdUSB (2.0)
    0,           // bDeviceClass (per interface)
    0,           // bDeviceSubClass
    0,           // bDeviceProtocol
    EP0_SIZE,    // bMaxPacketSize0
    0xC0, 0x16,  // idVendor (0x16C0)
    0x7C, 0x04,  // idProduct (0x047C, keyboard)
    0x00, 0x01,  // bcdDevice (1.0)
    1,           // iManufacturer
    2,           // iProduct
    0,           // iSerialNumber
    1,           // bNumConfigurations
];

/// Offset of the HID class descriptor inside [`CONFIGURATION`].
const HID_DESC_OFFSET: usize = 18;
const CONFIG_LEN: u8 = 9 + 9 + 9 + 7;

static CONFIGURATION: [u8; CONFIG_LEN as usize] = [
    // Configuration
    9, DESC_CONFIGURATION,
    CONFIG_LEN, 0, // wTotalLength
    1,             // bNumInterfaces
    1,             // bConfigurationValue
    0,             // iConfiguration
    0xC0,          // bmAttributes (self powered)
    50,            // bMaxPower (100mA)
    // Interface
    9, 4,
    0, // bInterfaceNumber
    0, // bAlternateSetting
    1, // bNumEndpoints
    3, // bInterfaceClass (HID)
    1, // bInterfaceSubClass (Boot)
    1, // bInterfaceProtocol (Keyboard)
    0, // iInterface
    // HID
    9, DESC_HID,
    0x11, 0x01, // bcdHID (1.11)
    0,          // bCountryCode
    1,          // bNumDescriptors
    DESC_HID_REPORT,
    REPORT_DESCRIPTOR.len() as u8, 0,
    // Endpoint
    7, 5,
    KEYBOARD_EP | 0x80, // IN
    0x03,               // Interrupt
    KEYBOARD_EP_SIZE, 0,
    1, // bInterval (1ms)
];

static LANGUAGE: [u8; 4] = [4, DESC_STRING, 0x09, 0x04]; // English (US)

static MANUFACTURER: [u8; 16] = [
    16, DESC_STRING,
    b'P', 0, b'h', 0, b'a', 0, b'n', 0, b't', 0, b'o', 0, b'm', 0,
];

static PRODUCT: [u8; 18] = [
    18, DESC_STRING,
    b'K', 0, b'e', 0, b'y', 0, b'b', 0, b'o', 0, b'a', 0, b'r', 0, b'd', 0,
];

/// Resolve a GET_DESCRIPTOR `wValue` (type in the high byte, index in the
/// low byte) to the descriptor bytes.
pub fn lookup(value: u16) -> Option<&'static [u8]> {
    let [index, kind] = value.to_le_bytes();
    match (kind, index) {
        (DESC_DEVICE, 0) => Some(&DEVICE),
        (DESC_CONFIGURATION, 0) => Some(&CONFIGURATION),
        (DESC_STRING, 0) => Some(&LANGUAGE),
        (DESC_STRING, 1) => Some(&MANUFACTURER),
        (DESC_STRING, 2) => Some(&PRODUCT),
        (DESC_HID, 0) => Some(&CONFIGURATION[HID_DESC_OFFSET..HID_DESC_OFFSET + 9]),
        (DESC_HID_REPORT, 0) => Some(&REPORT_DESCRIPTOR),
        _ => None,
    }
}
