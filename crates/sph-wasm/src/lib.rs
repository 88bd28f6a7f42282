use glam::{UVec3, Vec3};
use sph_core::spawn::LatticeSpawner;
use sph_core::{FluidConfig, ParticleState, Solver};
use wasm_bindgen::prelude::*;

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct FluidWorld {
    solver: Solver,
    /// One 32-byte `ParticleState` per particle, read directly by the renderer
    gpu_buffer: Vec<ParticleState>,
}

#[wasm_bindgen]
impl FluidWorld {
    /// Reference tank with a `rows`^3 jittered block.
    #[wasm_bindgen(constructor)]
    pub fn new(rows: u32, seed: u32) -> Result<FluidWorld, JsValue> {
        let config = FluidConfig::default();
        let spawner = LatticeSpawner::cube(rows, 0.2, Vec3::ZERO)
            .centered_on(config.bounds.center())
            .with_jitter(0.2)
            .with_seed(seed as u64);
        Self::build(spawner, config)
    }

    /// World from a JSON `FluidConfig` and an explicit lattice.
    #[wasm_bindgen]
    pub fn from_config(
        config_json: &str,
        rows_x: u32,
        rows_y: u32,
        rows_z: u32,
        spacing: f32,
        jitter: f32,
        seed: u32,
    ) -> Result<FluidWorld, JsValue> {
        let config = FluidConfig::from_json_str(config_json).map_err(to_js_error)?;
        let spawner = LatticeSpawner::new(UVec3::new(rows_x, rows_y, rows_z), spacing, Vec3::ZERO)
            .centered_on(config.bounds.center())
            .with_jitter(jitter)
            .with_seed(seed as u64);
        Self::build(spawner, config)
    }

    /// Run `steps` fixed timesteps and refresh the buffer. Returns elapsed ms.
    #[wasm_bindgen]
    pub fn step(&mut self, steps: u32) -> f32 {
        let start = js_sys::Date::now();
        for _ in 0..steps {
            self.solver.step();
        }
        self.write_gpu_output();
        let elapsed = js_sys::Date::now() - start;
        elapsed as f32
    }

    #[wasm_bindgen]
    pub fn get_gpu_buffer_ptr(&self) -> *const f32 {
        self.gpu_buffer.as_ptr() as *const f32
    }

    #[wasm_bindgen]
    pub fn get_gpu_buffer_byte_length(&self) -> usize {
        bytemuck::cast_slice::<ParticleState, u8>(&self.gpu_buffer).len()
    }

    #[wasm_bindgen]
    pub fn particle_count(&self) -> usize {
        self.solver.particles.count
    }

    #[wasm_bindgen]
    pub fn steps_taken(&self) -> f64 {
        self.solver.steps_taken() as f64
    }

    /// Replace the configuration with a JSON `FluidConfig`.
    #[wasm_bindgen]
    pub fn set_config(&mut self, config_json: &str) -> Result<(), JsValue> {
        let config = FluidConfig::from_json_str(config_json).map_err(to_js_error)?;
        self.solver.set_config(config).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn config_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.solver.config()).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn set_gravity(&mut self, x: f32, y: f32, z: f32) -> Result<(), JsValue> {
        let mut config = self.solver.config().clone();
        config.gravity = Vec3::new(x, y, z);
        self.solver.set_config(config).map_err(to_js_error)
    }

    /// Mean and max density, max speed, mean neighbor count.
    #[wasm_bindgen]
    pub fn stats(&self) -> Vec<f32> {
        let s = self.solver.stats();
        vec![s.mean_density, s.max_density, s.max_speed, s.mean_neighbors]
    }

    /// Re-spawn a fresh block with a new seed, keeping the configuration.
    #[wasm_bindgen]
    pub fn reinitialize(&mut self, rows: u32, seed: u32) {
        let spawner = LatticeSpawner::cube(rows, 0.2, Vec3::ZERO)
            .centered_on(self.solver.config().bounds.center())
            .with_jitter(0.2)
            .with_seed(seed as u64);
        let particles = spawner.spawn();
        self.gpu_buffer = vec![ParticleState::default(); particles.count];
        self.solver.reset(particles);
        self.write_gpu_output();
    }
}

impl FluidWorld {
    fn build(spawner: LatticeSpawner, config: FluidConfig) -> Result<FluidWorld, JsValue> {
        let particles = spawner.spawn();
        let count = particles.count;
        let solver = Solver::new(particles, config).map_err(to_js_error)?;

        web_sys::console::log_1(
            &format!("WASM FluidWorld created: {} particles", count).into()
        );

        let mut world = FluidWorld {
            solver,
            gpu_buffer: vec![ParticleState::default(); count],
        };
        world.write_gpu_output();
        Ok(world)
    }

    fn write_gpu_output(&mut self) {
        self.solver.particles.write_states(&mut self.gpu_buffer);
    }
}
