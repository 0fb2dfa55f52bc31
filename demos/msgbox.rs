//! Message boxes through lazily resolved `user32.dll` thunks.

#[cfg(windows)]
fn main() {
	use modlink::user32::{msg_box, msg_box_ansi};
	use modlink::{DialogResult, MessageBoxStyle};

	let style = MessageBoxStyle::YESNO | MessageBoxStyle::ICONQUESTION;
	match msg_box(None, "Resolve the next one through MessageBoxA?", "modlink", style) {
		Some(DialogResult::YES) => {
			let _ = msg_box_ansi(None, c"Hello from MessageBoxA!", c"Ok!", MessageBoxStyle::ICONINFORMATION);
		}
		Some(other) => println!("dismissed with {other:?}"),
		None => eprintln!("user32.dll is not available"),
	}
}

#[cfg(not(windows))]
fn main() {
	eprintln!("message boxes need user32.dll");
}
