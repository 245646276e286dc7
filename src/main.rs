mod cafe;
mod click;
mod config;
mod logging;
mod scene;
mod storage;
mod time;

use std::{cell::RefCell, io, rc::Rc};

use cafe::Cafe;
use click::{pixel_y_to_row, ClickState};
use config::{CafeConfig, TICKS_PER_SEC};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use scene::{Scene, KEY_BACK};
use storage::{KeyValueStore, MemoryStore};
use time::{GameTime, SystemClock};

struct App {
    cafe: Cafe,
    scene: Scene,
    time: GameTime,
}

impl App {
    fn press(&mut self, key: char) {
        self.scene.handle_action(&mut self.cafe, key);
    }
}

/// Query the grid container's bounding rect and convert pixel coordinates to a row.
fn dom_pixel_to_row(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<u16> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let click_y = mouse_y as f64 - rect.top();
    let click_x = mouse_x as f64 - rect.left();
    if click_x < 0.0 {
        return None;
    }

    let row = pixel_y_to_row(click_y, rect.height(), cs.terminal_rows);
    log::debug!("tap y={mouse_y} row={row:?} targets={}", cs.targets.len());
    row
}

fn frame_timestamp() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

#[cfg(target_arch = "wasm32")]
fn open_store() -> Rc<dyn KeyValueStore> {
    match storage::LocalStorage::open() {
        Ok(store) => Rc::new(store),
        Err(e) => {
            log::warn!("{e}; progress will only last for this visit");
            Rc::new(MemoryStore::new())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn open_store() -> Rc<dyn KeyValueStore> {
    Rc::new(MemoryStore::new())
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);

    let config = CafeConfig::default();
    let cafe = Cafe::open(&config, open_store(), Rc::new(SystemClock));
    let scene = Scene::new(&cafe, &config);
    let app = Rc::new(RefCell::new(App {
        cafe,
        scene,
        time: GameTime::new(TICKS_PER_SEC),
    }));
    let click_state = Rc::new(RefCell::new(ClickState::new()));

    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    terminal.on_mouse_event({
        let app = app.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let cs = click_state.borrow();
            if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                return;
            }
            let matched_key = dom_pixel_to_row(mouse_event.x, mouse_event.y, &cs)
                .and_then(|row| cs.find_target_key(row));
            drop(cs);

            if let Some(key) = matched_key {
                app.borrow_mut().press(key);
            }
        }
    });

    terminal.on_key_event({
        let app = app.clone();
        move |key_event| {
            let key = match key_event.code {
                KeyCode::Esc => KEY_BACK,
                KeyCode::Enter => 'e',
                KeyCode::Char(c) => c.to_ascii_lowercase(),
                _ => return,
            };
            app.borrow_mut().press(key);
        }
    });

    terminal.draw_web(move |f| {
        let mut app = app.borrow_mut();
        let App { cafe, scene, time } = &mut *app;
        let ticks = time.update(frame_timestamp());
        scene.tick(cafe, ticks);
        scene::render::render(scene, cafe, f, &click_state);
    });

    Ok(())
}
