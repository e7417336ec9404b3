use core::cell::RefCell;

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};
use embassy_time::Instant;
use esp_hal::{
    gpio::{Event, Input, InputConfig, InputPin, Io, Pull},
    handler,
    peripherals,
    ram,
};

/// Top-half invoked from interrupt context with the edge timestamp
pub type EdgeCallback = fn(Instant);

struct EdgeInputs {
    detection: Input<'static>,
    removal: Input<'static>,
}

struct EdgeCallbacks {
    on_detection: EdgeCallback,
    on_removal: EdgeCallback,
}

/// Detection and removal input pins
static INPUTS: Mutex<CriticalSectionRawMutex, RefCell<Option<EdgeInputs>>> =
    Mutex::new(RefCell::new(None));

/// Top-halves of both pipelines
static CALLBACKS: Mutex<CriticalSectionRawMutex, RefCell<Option<EdgeCallbacks>>> =
    Mutex::new(RefCell::new(None));

/// Listen for a rising edge on the detection pin and a falling edge on the
/// removal pin.
pub fn bind_edge_inputs(
    mux: peripherals::IO_MUX<'static>,
    detection: impl InputPin + 'static,
    removal: impl InputPin + 'static,
    on_detection: EdgeCallback,
    on_removal: EdgeCallback,
) {
    let mut io = Io::new(mux);
    io.set_interrupt_handler(handle_edge_interrupt);

    let mut detection = Input::new(detection, InputConfig::default().with_pull(Pull::Down));
    detection.listen(Event::RisingEdge);
    let mut removal = Input::new(removal, InputConfig::default().with_pull(Pull::Down));
    removal.listen(Event::FallingEdge);

    INPUTS.lock(|cell| {
        cell.borrow_mut().replace(EdgeInputs { detection, removal });
    });
    CALLBACKS.lock(|cell| {
        cell.borrow_mut().replace(EdgeCallbacks {
            on_detection,
            on_removal,
        });
    });
}

#[handler]
#[ram]
fn handle_edge_interrupt() {
    let now = Instant::now();

    let (detected, removed) = INPUTS.lock(|cell| {
        let mut cell = cell.borrow_mut();
        let Some(inputs) = cell.as_mut() else {
            return (false, false);
        };

        let detected = inputs.detection.is_interrupt_set();
        if detected {
            inputs.detection.clear_interrupt();
        }
        let removed = inputs.removal.is_interrupt_set();
        if removed {
            inputs.removal.clear_interrupt();
        }
        (detected, removed)
    });

    CALLBACKS.lock(|cell| {
        if let Some(callbacks) = cell.borrow().as_ref() {
            if detected {
                (callbacks.on_detection)(now);
            }
            if removed {
                (callbacks.on_removal)(now);
            }
        }
    });
}
