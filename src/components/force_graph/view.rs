//! Pan and zoom transform between screen and world coordinates.

/// Zoom bounds.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// Zoom factor per wheel notch or zoom button press.
pub const ZOOM_STEP: f64 = 1.1;

/// Pan and zoom applied to the whole graph: `screen = pan + world * k`.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to `MIN_ZOOM..=MAX_ZOOM`).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	/// Transform placing the world origin at the centre of a `width x height`
	/// canvas at 100% zoom.
	pub fn centered(width: f64, height: f64) -> Self {
		Self {
			x: width / 2.0,
			y: height / 2.0,
			k: 1.0,
		}
	}

	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(wx * self.k + self.x, wy * self.k + self.y)
	}

	/// Translate by a screen-space delta.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.x += dx;
		self.y += dy;
	}

	/// Multiply the zoom by `factor`, clamped. Anchored at the current pan
	/// offset, so the world origin stays put on screen.
	pub fn zoom_by(&mut self, factor: f64) {
		self.k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
	}

	/// Zoom factor for one wheel notch: out for positive deltas, in otherwise.
	pub fn wheel_factor(delta_y: f64) -> f64 {
		if delta_y > 0.0 {
			1.0 / ZOOM_STEP
		} else {
			ZOOM_STEP
		}
	}
}
