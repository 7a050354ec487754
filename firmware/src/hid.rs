//! USB HID keyboard transport on the ATmega32U4 USB controller.
//!
//! Enumeration and HID class requests are serviced by polling from the scan
//! loop; reports go out on an 8-byte interrupt IN endpoint.

use avr_device::atmega32u4::Peripherals;
use phantom_core::{HidTransport, KeyboardReport};

use crate::descriptors::{self, EP0_SIZE, KEYBOARD_EP};

// Standard requests
const GET_STATUS: u8 = 0x00;
const SET_ADDRESS: u8 = 0x05;
const GET_DESCRIPTOR: u8 = 0x06;
const GET_CONFIGURATION: u8 = 0x08;
const SET_CONFIGURATION: u8 = 0x09;

// HID class requests
const HID_GET_REPORT: u8 = 0x01;
const HID_GET_IDLE: u8 = 0x02;
const HID_GET_PROTOCOL: u8 = 0x03;
const HID_SET_REPORT: u8 = 0x09;
const HID_SET_IDLE: u8 = 0x0A;
const HID_SET_PROTOCOL: u8 = 0x0B;

/// Give up on a busy endpoint after this many polls and drop the report.
const SEND_TIMEOUT: u16 = 0xFFFF;

/// The 8-byte SETUP packet that opens every control transfer.
struct SetupPacket {
    request_type: u8,
    request: u8,
    value: u16,
    length: u16,
}

impl SetupPacket {
    fn read(dp: &Peripherals) -> Self {
        let mut raw = [0u8; 8];
        for byte in raw.iter_mut() {
            *byte = dp.USB_DEVICE.uedatx.read().bits();
        }
        Self {
            request_type: raw[0],
            request: raw[1],
            value: u16::from_le_bytes([raw[2], raw[3]]),
            length: u16::from_le_bytes([raw[6], raw[7]]),
        }
    }
}

pub struct UsbKeyboard<'a> {
    dp: &'a Peripherals,
    configured: bool,
    /// Idle rate set by the host, in 4ms units. Stored for GET_IDLE only.
    idle_rate: u8,
    /// 0 = boot protocol, 1 = report protocol.
    protocol: u8,
    /// Last report handed to us, returned on GET_REPORT.
    current: KeyboardReport,
}

impl<'a> UsbKeyboard<'a> {
    pub fn new(dp: &'a Peripherals) -> Self {
        Self {
            dp,
            configured: false,
            idle_rate: 125,
            protocol: 1,
            current: KeyboardReport::empty(),
        }
    }

    /// Power up the USB controller and attach to the bus.
    pub fn init(&mut self) {
        let usb = &self.dp.USB_DEVICE;

        usb.uhwcon.write(|w| w.uvrege().set_bit());
        usb.usbcon.write(|w| w.usbe().set_bit().otgpade().set_bit());

        // 16MHz crystal -> 48MHz USB clock
        self.dp.PLL.pllcsr.write(|w| w.pindiv().set_bit().plle().set_bit());
        while self.dp.PLL.pllcsr.read().plock().bit_is_clear() {}

        usb.usbcon.modify(|_, w| w.frzclk().clear_bit());
        usb.udcon.modify(|_, w| w.detach().clear_bit());
        usb.udien.write(|w| w.eorste().set_bit());

        self.configured = false;
    }

    fn select_endpoint(&self, ep: u8) {
        self.dp.USB_DEVICE.uenum.write(|w| w.bits(ep & 0x07));
    }

    fn configure_control_endpoint(&self) {
        let usb = &self.dp.USB_DEVICE;
        self.select_endpoint(0);
        usb.ueconx.write(|w| w.epen().set_bit());
        usb.uecfg0x.write(|w| w.eptype().bits(0b00));
        // 32 bytes, one bank
        usb.uecfg1x.write(|w| w.epsize().bits(0b010).alloc().set_bit());
    }

    fn configure_keyboard_endpoint(&self) {
        let dp = self.dp;
        let usb = &dp.USB_DEVICE;
        self.select_endpoint(KEYBOARD_EP);
        usb.ueconx.write(|w| w.epen().set_bit());
        // Interrupt IN
        usb.uecfg0x.write(|w| w.eptype().bits(0b11).epdir().set_bit());
        // 8 bytes, one bank
        usb.uecfg1x.write(|w| w.epsize().bits(0b000).alloc().set_bit());
    }

    fn wait_in_ready(&self) {
        while self.dp.USB_DEVICE.ueintx.read().txini().bit_is_clear() {}
    }

    fn wait_out_received(&self) {
        while self.dp.USB_DEVICE.ueintx.read().rxouti().bit_is_clear() {}
    }

    /// Finish a no-data request with a zero-length IN packet.
    fn send_zlp(&self) {
        self.dp.USB_DEVICE.ueintx.modify(|_, w| w.txini().clear_bit());
    }

    fn stall(&self) {
        self.dp.USB_DEVICE.ueconx.modify(|_, w| w.stallrq().set_bit());
    }

    /// IN data stage in EP0-sized chunks, then wait for the host's status OUT.
    fn send_control(&self, data: &[u8], requested: u16) {
        let usb = &self.dp.USB_DEVICE;
        let len = core::cmp::min(data.len(), requested as usize);

        for chunk in data[..len].chunks(EP0_SIZE as usize) {
            self.wait_in_ready();
            for &byte in chunk {
                usb.uedatx.write(|w| w.bits(byte));
            }
            usb.ueintx.modify(|_, w| w.txini().clear_bit());
        }

        self.wait_out_received();
        usb.ueintx.modify(|_, w| w.rxouti().clear_bit());
    }

    fn handle_setup(&mut self) {
        let dp = self.dp;
        let usb = &dp.USB_DEVICE;
        let setup = SetupPacket::read(dp);
        usb.ueintx.modify(|_, w| w.rxstpi().clear_bit());

        match (setup.request_type, setup.request) {
            (0x80 | 0x81, GET_DESCRIPTOR) => match descriptors::lookup(setup.value) {
                Some(desc) => self.send_control(desc, setup.length),
                None => self.stall(),
            },

            (0x00, SET_ADDRESS) => {
                self.send_zlp();
                self.wait_in_ready();
                let address = (setup.value & 0x7F) as u8;
                usb.udaddr.write(|w| w.uadd().bits(address).adden().set_bit());
            }

            (0x00, SET_CONFIGURATION) => {
                self.send_zlp();
                self.configure_keyboard_endpoint();
                self.select_endpoint(0);
                self.configured = setup.value != 0;
            }

            (0x80, GET_CONFIGURATION) => {
                self.send_control(&[self.configured as u8], setup.length);
            }

            (0x80..=0x82, GET_STATUS) => {
                self.send_control(&[0, 0], setup.length);
            }

            (0xA1, HID_GET_REPORT) => {
                let bytes = self.current.as_bytes();
                self.send_control(&bytes, setup.length);
            }

            (0xA1, HID_GET_IDLE) => {
                self.send_control(&[self.idle_rate], setup.length);
            }

            (0xA1, HID_GET_PROTOCOL) => {
                self.send_control(&[self.protocol], setup.length);
            }

            (0x21, HID_SET_REPORT) => {
                // LED state; indicators are not wired, so it is read and dropped
                self.wait_out_received();
                let _leds = usb.uedatx.read().bits();
                usb.ueintx.modify(|_, w| w.rxouti().clear_bit());
                self.send_zlp();
            }

            (0x21, HID_SET_IDLE) => {
                self.idle_rate = (setup.value >> 8) as u8;
                self.send_zlp();
            }

            (0x21, HID_SET_PROTOCOL) => {
                self.protocol = setup.value as u8;
                self.send_zlp();
            }

            _ => self.stall(),
        }
    }
}

impl HidTransport for UsbKeyboard<'_> {
    fn poll(&mut self) {
        let dp = self.dp;
        let usb = &dp.USB_DEVICE;

        if usb.udint.read().eorsti().bit_is_set() {
            usb.udint.modify(|_, w| w.eorsti().clear_bit());
            self.configure_control_endpoint();
            self.configured = false;
        }

        self.select_endpoint(0);
        if usb.ueintx.read().rxstpi().bit_is_set() {
            self.handle_setup();
        }
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn send_report(&mut self, report: &KeyboardReport) {
        self.current = *report;
        if !self.configured {
            return;
        }

        let dp = self.dp;
        let usb = &dp.USB_DEVICE;
        self.select_endpoint(KEYBOARD_EP);

        // RWAL set means the bank has room
        let mut timeout = SEND_TIMEOUT;
        while usb.ueintx.read().rwal().bit_is_clear() {
            timeout -= 1;
            if timeout == 0 {
                return;
            }
        }

        for byte in report.as_bytes() {
            usb.uedatx.write(|w| w.bits(byte));
        }
        usb.ueintx.modify(|_, w| w.fifocon().clear_bit().txini().clear_bit());
    }
}
