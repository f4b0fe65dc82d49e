//! Four-dimensional simplex noise (Gustavson), seeded from any `rand` source.
//!
//! Output is roughly in [-1, 1].

use rand::seq::SliceRandom;
use rand::Rng;

const GRAD4: [[f32; 4]; 32] = [
    [0.0, 1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0, -1.0],
    [0.0, 1.0, -1.0, 1.0],
    [0.0, 1.0, -1.0, -1.0],
    [0.0, -1.0, 1.0, 1.0],
    [0.0, -1.0, 1.0, -1.0],
    [0.0, -1.0, -1.0, 1.0],
    [0.0, -1.0, -1.0, -1.0],
    [1.0, 0.0, 1.0, 1.0],
    [1.0, 0.0, 1.0, -1.0],
    [1.0, 0.0, -1.0, 1.0],
    [1.0, 0.0, -1.0, -1.0],
    [-1.0, 0.0, 1.0, 1.0],
    [-1.0, 0.0, 1.0, -1.0],
    [-1.0, 0.0, -1.0, 1.0],
    [-1.0, 0.0, -1.0, -1.0],
    [1.0, 1.0, 0.0, 1.0],
    [1.0, 1.0, 0.0, -1.0],
    [1.0, -1.0, 0.0, 1.0],
    [1.0, -1.0, 0.0, -1.0],
    [-1.0, 1.0, 0.0, 1.0],
    [-1.0, 1.0, 0.0, -1.0],
    [-1.0, -1.0, 0.0, 1.0],
    [-1.0, -1.0, 0.0, -1.0],
    [1.0, 1.0, 1.0, 0.0],
    [1.0, 1.0, -1.0, 0.0],
    [1.0, -1.0, 1.0, 0.0],
    [1.0, -1.0, -1.0, 0.0],
    [-1.0, 1.0, 1.0, 0.0],
    [-1.0, 1.0, -1.0, 0.0],
    [-1.0, -1.0, 1.0, 0.0],
    [-1.0, -1.0, -1.0, 0.0],
];

// Skewing factors: (sqrt(5) - 1) / 4 and (5 - sqrt(5)) / 20.
const F4: f32 = 0.309_017;
const G4: f32 = 0.138_196_6;

#[derive(Clone)]
pub struct SimplexNoise {
    perm: [u8; 512],
}

impl SimplexNoise {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut p: [u8; 256] = std::array::from_fn(|i| i as u8);
        p.shuffle(rng);
        let perm = std::array::from_fn(|i| p[i & 255]);
        Self { perm }
    }

    #[inline]
    fn hash(&self, i: usize, j: usize, k: usize, l: usize) -> usize {
        let p = &self.perm;
        p[i + p[j + p[k + p[l] as usize] as usize] as usize] as usize % 32
    }

    pub fn noise4d(&self, x: f32, y: f32, z: f32, w: f32) -> f32 {
        let s = (x + y + z + w) * F4;
        let i = (x + s).floor();
        let j = (y + s).floor();
        let k = (z + s).floor();
        let l = (w + s).floor();
        let t = (i + j + k + l) * G4;
        let x0 = x - (i - t);
        let y0 = y - (j - t);
        let z0 = z - (k - t);
        let w0 = w - (l - t);

        // Rank the coordinates to find which of the 24 simplices we are in.
        let mut rank = [0u8; 4];
        let c = [x0, y0, z0, w0];
        for a in 0..4 {
            for b in (a + 1)..4 {
                if c[a] > c[b] {
                    rank[a] += 1;
                } else {
                    rank[b] += 1;
                }
            }
        }
        let step = |threshold: u8| -> [f32; 4] {
            std::array::from_fn(|n| if rank[n] >= threshold { 1.0 } else { 0.0 })
        };
        let o1 = step(3);
        let o2 = step(2);
        let o3 = step(1);

        let corners = [
            [x0, y0, z0, w0],
            offset(c, o1, G4),
            offset(c, o2, 2.0 * G4),
            offset(c, o3, 3.0 * G4),
            offset(c, [1.0; 4], 4.0 * G4),
        ];
        let lattice = [[0.0; 4], o1, o2, o3, [1.0; 4]];

        let ii = (i as i32 & 255) as usize;
        let jj = (j as i32 & 255) as usize;
        let kk = (k as i32 & 255) as usize;
        let ll = (l as i32 & 255) as usize;

        let mut total = 0.0;
        for (corner, off) in corners.iter().zip(lattice.iter()) {
            let t = 0.6
                - corner[0] * corner[0]
                - corner[1] * corner[1]
                - corner[2] * corner[2]
                - corner[3] * corner[3];
            if t < 0.0 {
                continue;
            }
            let g = GRAD4[self.hash(
                ii + off[0] as usize,
                jj + off[1] as usize,
                kk + off[2] as usize,
                ll + off[3] as usize,
            )];
            let t2 = t * t;
            total += t2
                * t2
                * (g[0] * corner[0] + g[1] * corner[1] + g[2] * corner[2] + g[3] * corner[3]);
        }
        27.0 * total
    }
}

#[inline]
fn offset(c: [f32; 4], o: [f32; 4], g: f32) -> [f32; 4] {
    std::array::from_fn(|n| c[n] - o[n] + g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn stays_bounded_and_varies() {
        let noise = SimplexNoise::new(&mut StdRng::seed_from_u64(7));
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for n in 0..2000 {
            let f = n as f32 * 0.137;
            let v = noise.noise4d(f.sin() * 3.0, f * 0.31, f.cos() * 2.0, f * 0.05);
            assert!(v.is_finite());
            assert!(v.abs() <= 1.2, "sample {v} out of range");
            min = min.min(v);
            max = max.max(v);
        }
        assert!(max - min > 0.5);
    }

    #[test]
    fn same_seed_same_field() {
        let a = SimplexNoise::new(&mut StdRng::seed_from_u64(3));
        let b = SimplexNoise::new(&mut StdRng::seed_from_u64(3));
        assert_eq!(a.noise4d(0.3, 1.7, -2.2, 0.9), b.noise4d(0.3, 1.7, -2.2, 0.9));
    }
}
