#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::{error, info};
use embassy_embedded_hal::shared_bus::blocking::spi::SpiDeviceWithConfig;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::spi::{Config as SpiConfig, Spi};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_time::Timer;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

// Provides the parallel port and display interface builders
use mipidsi::interface::SpiInterface;

// Provides the Display builder
use mipidsi::{models::ST7789, options::ColorInversion, Builder};

use snake_console::{exit_code, GameConfig, GameEngine, Position};

mod hardware;

use hardware::pico_waveshare::{
    PicoClock, PicoHost, PicoWaveshareJoystick, PicoWaveshareScreen, LCD_HEIGHT, LCD_WIDTH,
};

// 27x48 cells of 5 pixels on the portrait panel.
const CONFIG: GameConfig = GameConfig::DEFAULT
    .with_screen_size(LCD_WIDTH, LCD_HEIGHT)
    .with_block_size(5)
    .with_frame_rate(7)
    .with_start(Position::new(60, 120), 4, Position::new(60, 60));

type SpiBus = BlockingMutex<NoopRawMutex, RefCell<Spi<'static, embassy_rp::peripherals::SPI1, embassy_rp::spi::Blocking>>>;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    // Configure SPI for display
    let mosi = p.PIN_11; // SDA
    let clk = p.PIN_10; // SCL
    let cs = p.PIN_9; // CS
    let dc = p.PIN_8; // DC
    let rst = p.PIN_12; // RST
    let bl = p.PIN_13; // Backlight

    let mut spi_config = SpiConfig::default();
    spi_config.frequency = 62_500_000; // 62.5 MHz

    // Use blocking SPI
    let spi = Spi::new_blocking_txonly(p.SPI1, clk, mosi, spi_config.clone());

    // Create shared SPI bus
    static SPI_BUS: StaticCell<SpiBus> = StaticCell::new();
    let spi_bus = SPI_BUS.init(BlockingMutex::new(RefCell::new(spi)));

    // Create SPI device with CS pin
    let spi_device = SpiDeviceWithConfig::new(spi_bus, Output::new(cs, Level::High), spi_config);

    // Buffer for mipidsi
    static SPI_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();
    let buffer = SPI_BUFFER.init([0; 64]);

    // Create SPI interface
    let spi_interface = SpiInterface::new(spi_device, Output::new(dc, Level::Low), buffer);

    // Create reset pin
    let reset_pin = Output::new(rst, Level::High);

    let display = Builder::new(ST7789, spi_interface)
        .display_size(LCD_WIDTH as u16, LCD_HEIGHT as u16)
        .display_offset(53, 40) // Waveshare LCD 1.14" offset for 90° rotation
        .invert_colors(ColorInversion::Inverted)
        .reset_pin(reset_pin)
        .init(&mut embassy_time::Delay)
        .unwrap();

    // Backlight stays off until the engine enables the screen
    let backlight = Output::new(bl, Level::Low);

    // Joystick pins on the pico lcd 1.14:
    // gp2 up, gp3 ctrl, gp16 left, gp18 down, gp20 right
    // User buttons: gp15 A, gp17 B
    let joystick = PicoWaveshareJoystick::new(
        Input::new(p.PIN_2, Pull::Up),
        Input::new(p.PIN_18, Pull::Up),
        Input::new(p.PIN_16, Pull::Up),
        Input::new(p.PIN_20, Pull::Up),
        Input::new(p.PIN_15, Pull::Up),
        Input::new(p.PIN_17, Pull::Up),
    );

    info!("Display initialized, starting Snake with joystick control!");

    let screen = PicoWaveshareScreen::new(display, backlight);
    let mut engine = GameEngine::new(screen, joystick, PicoHost::new(), PicoClock, CONFIG);

    let result = engine.run();
    match &result {
        Ok(outcome) => info!("Game over: {}", outcome),
        Err(err) => error!("Game aborted: {}", defmt::Display2Format(err)),
    }
    info!("Exit code {}", exit_code(&result));

    // Nothing to return to on bare metal
    loop {
        Timer::after_secs(1).await;
    }
}
