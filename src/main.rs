//! Memory Match entry point
//!
//! On the web this is a thin shell: it draws the board from the session
//! state, forwards clicks, and drives the timer clock from animation frames.
//! Natively it runs a few autoplayed sessions to exercise the lives carry-over.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, MouseEvent};

    use memory_match::lives::LocalStorageLivesStore;
    use memory_match::{Session, Settings};

    /// Game instance holding all state
    struct Game {
        session: Session<LocalStorageLivesStore>,
        /// One button per grid position
        card_els: Vec<Element>,
        last_time: f64,
        /// Sub-millisecond remainder carried between frames
        accumulator: f64,
    }

    impl Game {
        /// Advance timers by the wall-clock time since the last frame
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time).clamp(0.0, 1000.0)
            } else {
                0.0
            };
            self.last_time = time;

            self.accumulator += dt;
            let whole = self.accumulator.floor();
            self.accumulator -= whole;
            self.session.advance(whole as u64);
        }

        /// Sync card classes and HUD elements with the state
        fn render(&self, document: &Document) {
            let state = self.session.state();

            for (el, card) in self.card_els.iter().zip(&state.cards) {
                let mut class = String::from("card");
                if card.is_face_up() {
                    class.push_str(" flipped");
                }
                if card.is_matched {
                    class.push_str(" matched");
                }
                if !state.accepts_input() {
                    class.push_str(" locked");
                }
                if el.get_attribute("class").as_deref() != Some(class.as_str()) {
                    let _ = el.set_attribute("class", &class);
                }
                let src = if card.is_face_up() {
                    card.image.as_str()
                } else {
                    "/images/card-back.png"
                };
                if el.get_attribute("data-src").as_deref() != Some(src) {
                    let _ = el.set_attribute("data-src", src);
                    let _ = el.set_attribute("style", &format!("background-image: url('{src}')"));
                }
            }

            if let Some(el) = document.get_element_by_id("lives") {
                let hearts: String = (0..self.session.baseline())
                    .map(|i| if i < state.lives { '♥' } else { '♡' })
                    .collect();
                el.set_text_content(Some(&hearts));
                let class = if state.is_shaking { "shake" } else { "" };
                let _ = el.set_attribute("class", class);
            }
            if let Some(el) = document.get_element_by_id("pairs") {
                el.set_text_content(Some(&format!(
                    "{}/{}",
                    state.matched_pairs, state.pair_count
                )));
            }
            if let Some(el) = document.get_element_by_id("moves") {
                el.set_text_content(Some(&state.move_count.to_string()));
            }
            set_hidden(document, "win-overlay", !state.is_won);
            set_hidden(document, "loss-overlay", !state.is_lost);
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let class = if hidden { "overlay hidden" } else { "overlay" };
            let _ = el.set_attribute("class", class);
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
        log::info!("Memory Match starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let session = match Session::new(settings, LocalStorageLivesStore::new(), seed) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Cannot start game: {}", e);
                return;
            }
        };

        let board = document.get_element_by_id("board").expect("no board");
        let card_els: Vec<Element> = (0..session.state().cards.len())
            .map(|i| {
                let el = document.create_element("button").expect("create button");
                let _ = el.set_attribute("id", &format!("card-{i}"));
                let _ = board.append_child(&el);
                el
            })
            .collect();

        let game = Rc::new(RefCell::new(Game {
            session,
            card_els,
            last_time: 0.0,
            accumulator: 0.0,
        }));

        setup_card_handlers(game.clone());
        setup_reset_buttons(game.clone());

        game.borrow().render(&document);
        request_animation_frame(game);
        log::info!("Memory Match running!");
    }

    fn setup_card_handlers(game: Rc<RefCell<Game>>) {
        let els = game.borrow().card_els.clone();
        for (id, el) in els.into_iter().enumerate() {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().session.select_card(id);
            });
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_reset_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        // Header reset plus the buttons on both end screens
        for id in ["reset-btn", "win-reset-btn", "loss-reset-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    game.borrow_mut().session.request_reset();
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.render(&document);
            }
        }
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use memory_match::lives::{FileLivesStore, MemoryLivesStore};

    env_logger::init();
    log::info!("Memory Match (native) starting...");

    // memory-match [sessions] [player memory]
    let mut args = std::env::args().skip(1);
    let sessions: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);
    let memory: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(6);

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let result = match FileLivesStore::default_path() {
        Some(path) => demo::run(FileLivesStore::new(path), seed, sessions, memory),
        None => demo::run(MemoryLivesStore::new(), seed, sessions, memory),
    };
    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use memory_match::autoplay::{Autoplayer, play_to_end};
    use memory_match::lives::LivesStore;
    use memory_match::{ConfigError, Session, Settings};

    /// Frame step used while waiting on timers
    const STEP_MS: u64 = 16;

    pub fn run<S: LivesStore>(
        store: S,
        seed: u64,
        sessions: u32,
        memory: usize,
    ) -> Result<(), ConfigError> {
        let mut session = Session::new(Settings::load(), store, seed)?;
        let mut player = Autoplayer::new(memory);

        for round in 1..=sessions {
            let lives = session.state().lives;
            let phase = play_to_end(&mut session, &mut player, STEP_MS);
            let state = session.state();
            println!(
                "Session {round}: {phase:?} with {lives} lives, {}/{} pairs in {} moves ({} ms)",
                state.matched_pairs,
                state.pair_count,
                state.move_count,
                session.now_ms()
            );

            session.request_reset();
            player.forget_all();
            println!("  next session starts with {} lives", session.state().lives);
        }
        Ok(())
    }
}
