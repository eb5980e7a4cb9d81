#![no_main]
#![no_std]

mod clock;
mod panel;

use core::sync::atomic::{AtomicBool, Ordering};

use cortex_m_rt::entry;
use critical_section_lock_mut::LockMut;
use embedded_hal::{delay::DelayNs, digital::InputPin};
use panic_rtt_target as _;
use rtt_target::{rprintln, rtt_init_print};

use microbit::{
    display::nonblocking::Display,
    hal::{
        gpio::{Input, Level, Pin, PullUp},
        gpiote,
        pac::{self, interrupt, TIMER0, UARTE0},
        timer::{Periodic, Timer},
        uarte::{self, Baudrate, Parity, Uarte},
    },
    Board,
};

use mallet_core::{AudioLink, Game, GameConfig, GameState, Millis, PollReport, TickSource};

use clock::Monotonic;
use panel::{Panel, DISPLAY};

const TICK_PERIOD_US: u32 = 1_000_000; // 1 second
const POLL_INTERVAL_MS: u32 = 10;
const SENSOR_COUNT: usize = 5;

const CONFIG: GameConfig = GameConfig::DEFAULT.with_intro(1, Millis::from_ticks(3_000));

// Shared with the interrupt handlers
static TICKS: TickSource = TickSource::new();
static START_EDGE: AtomicBool = AtomicBool::new(false);
static TICK_TIMER: LockMut<Timer<TIMER0, Periodic>> = LockMut::new();
static GPIOTE_PERIPHERAL: LockMut<gpiote::Gpiote> = LockMut::new();

// TIMER0: the 1 s game tick. Runs entirely inside the lock, so nothing preempts it.
#[interrupt]
fn TIMER0() {
    TICK_TIMER.with_lock(|timer| {
        timer.reset_event();
        TICKS.on_tick();
    });
}

// TIMER1 drives the LED matrix refresh
#[interrupt]
fn TIMER1() {
    DISPLAY.with_lock(|display| display.handle_display_event());
}

// GPIOTE: button A pressed. Only latch it; the loop debounces.
#[interrupt]
fn GPIOTE() {
    GPIOTE_PERIPHERAL.with_lock(|gpiote| {
        if gpiote.channel0().is_event_triggered() {
            START_EDGE.store(true, Ordering::Release);
            gpiote.channel0().reset_events();
        }
    });
}

/// Audio module on UARTE0, 9600 8N1.
struct AudioPort(Uarte<UARTE0>);

impl AudioLink for AudioPort {
    fn send(&mut self, frame: &[u8]) {
        // EasyDMA can only read from RAM
        let mut buf = [0u8; 8];
        let len = frame.len().min(buf.len());
        buf[..len].copy_from_slice(&frame[..len]);

        if let Err(err) = self.0.write(&buf[..len]) {
            rprintln!("audio frame dropped: {:?}", err);
        }
    }
}

/// Goal sensors on the edge connector. Active low: the sensor pulls the line down when
/// something is in front of it.
struct Sensors([Pin<Input<PullUp>>; SENSOR_COUNT]);

impl Sensors {
    fn read(&mut self) -> [bool; SENSOR_COUNT] {
        let mut readings = [false; SENSOR_COUNT];
        for (present, pin) in readings.iter_mut().zip(self.0.iter_mut()) {
            *present = pin.is_low().unwrap_or(false);
        }
        readings
    }
}

#[entry]
fn main() -> ! {
    rtt_init_print!();
    let board = Board::take().unwrap();

    // Non-blocking display with TIMER1
    DISPLAY.init(Display::new(board.TIMER1, board.display_pins));

    // Audio module
    let uarte = Uarte::new(
        board.UARTE0,
        uarte::Pins {
            txd: board.edge.e16.into_push_pull_output(Level::High).degrade(),
            rxd: board.edge.e12.into_floating_input().degrade(),
            cts: None,
            rts: None,
        },
        Parity::EXCLUDED,
        Baudrate::BAUD9600,
    );

    let mut sensors = Sensors([
        board.edge.e00.into_pullup_input().degrade(),
        board.edge.e01.into_pullup_input().degrade(),
        board.edge.e02.into_pullup_input().degrade(),
        board.edge.e08.into_pullup_input().degrade(),
        board.edge.e09.into_pullup_input().degrade(),
    ]);

    // Start button: button A, high-to-low = press
    let button_a = board.buttons.button_a.into_floating_input();
    let gpiote = gpiote::Gpiote::new(board.GPIOTE);
    let channel0 = gpiote.channel0();
    channel0
        .input_pin(&button_a.degrade())
        .hi_to_lo()
        .enable_interrupt();
    channel0.reset_events();
    GPIOTE_PERIPHERAL.init(gpiote);

    // Game tick
    let mut tick_timer = Timer::periodic(board.TIMER0);
    tick_timer.enable_interrupt();
    tick_timer.start(TICK_PERIOD_US);
    TICK_TIMER.init(tick_timer);

    let mut clock = Monotonic::new(Timer::periodic(board.TIMER2));
    let mut delay = Timer::new(board.TIMER3);

    let mut game: Game<_, _, SENSOR_COUNT> = Game::new(CONFIG, &TICKS, AudioPort(uarte), Panel);
    game.boot();

    // SAFETY: every handler's state is initialized above.
    unsafe {
        pac::NVIC::unmask(pac::Interrupt::TIMER1);
        pac::NVIC::unmask(pac::Interrupt::TIMER0);
        pac::NVIC::unmask(pac::Interrupt::GPIOTE);
    }
    pac::NVIC::unpend(pac::Interrupt::GPIOTE);

    rprintln!("=== Mallet game timer ===");
    rprintln!("Round: {} s, {} sensors", CONFIG.round_secs, SENSOR_COUNT);
    rprintln!("Press button A to start!");

    loop {
        let now = clock.now();

        if START_EDGE.swap(false, Ordering::AcqRel) && game.start_edge(now) {
            match game.state() {
                GameState::Priming => rprintln!("\n=== Get ready... ==="),
                _ => rprintln!("\n=== Countdown started! ==="),
            }
        }

        let readings = sensors.read();
        let report = game.poll(now, &readings);
        log_report(&report, game.score());

        delay.delay_ms(POLL_INTERVAL_MS);
    }
}

fn log_report(report: &PollReport, score: u32) {
    if let Some(goal) = report.goal {
        rprintln!("Goal on sensor {}! Score: {}", goal.sensor, goal.score);
    }
    if let Some(seconds) = report.countdown {
        rprintln!("Countdown: {} s", seconds);
    }
    match report.entered {
        Some(GameState::Counting) => rprintln!("=== Countdown started! ==="),
        Some(GameState::Finished) => {
            rprintln!("Countdown: 0 s");
            rprintln!("=== Time's up! Final score: {} ===", score);
        }
        Some(GameState::Idle) => rprintln!("Press button A to start a new round!"),
        Some(GameState::Priming) | None => {}
    }
}
