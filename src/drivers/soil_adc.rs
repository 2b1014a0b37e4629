//! One-shot ADC1 channel for the capacitive soil probe.
//!
//! Configures ADC1 with 12 dB attenuation and 12-bit width using raw
//! ESP-IDF sys calls.  The unit handle is owned by [`SoilAdc`] and released
//! on drop.

use esp_idf_sys::*;
use log::info;

use crate::error::SensorError;
use crate::sensors::SoilProbe;

/// GPIO34 is ADC1 channel 6 on the ESP32.
pub const SOIL_CHANNEL: adc_channel_t = adc_channel_t_ADC_CHANNEL_6;

pub struct SoilAdc {
    handle: adc_oneshot_unit_handle_t,
    channel: adc_channel_t,
}

impl SoilAdc {
    pub fn new(channel: adc_channel_t) -> Result<Self, SensorError> {
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        let mut handle: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        // SAFETY: `handle` is a valid out-pointer for the duration of the call.
        let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(SensorError::AdcInitFailed(ret));
        }
        let adc = Self { handle, channel };

        let chan_cfg = adc_oneshot_chan_cfg_t {
            atten: adc_atten_t_ADC_ATTEN_DB_12,
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        // SAFETY: handle was returned by adc_oneshot_new_unit above.
        let ret = unsafe { adc_oneshot_config_channel(adc.handle, channel, &chan_cfg) };
        if ret != ESP_OK as i32 {
            return Err(SensorError::AdcInitFailed(ret));
        }

        info!("soil_adc: ADC1 channel {} configured", channel);
        Ok(adc)
    }
}

impl SoilProbe for SoilAdc {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        let mut raw: i32 = 0;
        // SAFETY: handle is live for the lifetime of `self`; main-loop only.
        let ret = unsafe { adc_oneshot_read(self.handle, self.channel, &mut raw) };
        if ret != ESP_OK as i32 {
            return Err(SensorError::AdcReadFailed);
        }
        Ok(raw.clamp(0, 4095) as u16)
    }
}

impl Drop for SoilAdc {
    fn drop(&mut self) {
        // SAFETY: handle is not used after drop.
        unsafe {
            adc_oneshot_del_unit(self.handle);
        }
    }
}
