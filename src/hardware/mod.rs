pub mod pico_waveshare;
