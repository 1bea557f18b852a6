//! Keccak-f[1600] sponge with an extendable-output interface.
//!
//! The permutation operates on 25 little-endian 64-bit lanes (1600 bits)
//! over 24 rounds.  With a rate of 136 bytes and the `0x1F` domain byte
//! the construction is SHAKE256-compatible.
//!
//! Usage contract: any number of `absorb` calls, then exactly one
//! `absorb_domain_pad`, then any number of `squeeze` calls.

/// Sponge rate in bytes (1088 bits; capacity is the remaining 512 bits).
pub const RATE: usize = 136;

const ROUNDS: usize = 24;

const RC: [u64; 24] = [
    0x0000000000000001,
    0x0000000000008082,
    0x800000000000808a,
    0x8000000080008000,
    0x000000000000808b,
    0x0000000080000001,
    0x8000000080008081,
    0x8000000000008009,
    0x000000000000008a,
    0x0000000000000088,
    0x0000000080008009,
    0x000000008000000a,
    0x000000008000808b,
    0x800000000000008b,
    0x8000000000008089,
    0x8000000000008003,
    0x8000000000008002,
    0x8000000000000080,
    0x000000000000800a,
    0x800000008000000a,
    0x8000000080008081,
    0x8000000000008080,
    0x0000000080000001,
    0x8000000080008008,
];

/// Per-lane rotation offsets for the rho step, indexed `x + 5*y`.
const RHO: [u32; 25] = [
    0, 1, 62, 28, 27, //
    36, 44, 6, 55, 20, //
    3, 10, 43, 25, 39, //
    41, 45, 15, 21, 8, //
    18, 2, 61, 56, 14,
];

/// Sponge state plus the input queue for partial-block absorption.
///
/// Invariant: `queue[queued..]` is always zero, so the domain-separation
/// pad can XOR directly into the queue.
pub struct SpongeXof {
    lanes: [u64; 25],
    queue: [u8; RATE],
    queued: usize,
}

impl SpongeXof {
    /// Fresh sponge with an all-zero state.
    pub fn new() -> Self {
        Self {
            lanes: [0u64; 25],
            queue: [0u8; RATE],
            queued: 0,
        }
    }

    /// Clear all state back to the post-construction value.
    pub fn reset(&mut self) {
        self.lanes = [0u64; 25];
        self.queue = [0u8; RATE];
        self.queued = 0;
    }

    /// Absorb message bytes, permuting on every full rate block.
    pub fn absorb(&mut self, data: &[u8]) {
        let mut off = 0;

        if self.queued > 0 && !data.is_empty() {
            let take = (RATE - self.queued).min(data.len());
            self.queue[self.queued..self.queued + take].copy_from_slice(&data[..take]);
            self.queued += take;
            off += take;
            if self.queued == RATE {
                let block = self.queue;
                self.absorb_block(&block);
                self.queue = [0u8; RATE];
                self.queued = 0;
            }
        }

        while off + RATE <= data.len() {
            let block: [u8; RATE] = data[off..off + RATE].try_into().unwrap();
            self.absorb_block(&block);
            off += RATE;
        }

        if off < data.len() {
            let rem = data.len() - off;
            self.queue[..rem].copy_from_slice(&data[off..]);
            self.queued = rem;
        }
    }

    /// Terminate absorption: XOR the domain byte at the queue offset and
    /// `0x80` at the final rate byte, absorb the padded block, clear the
    /// queue.  Must be called exactly once before the first `squeeze`.
    pub fn absorb_domain_pad(&mut self, domain: u8) {
        self.queue[self.queued] ^= domain;
        self.queue[RATE - 1] ^= 0x80;
        let block = self.queue;
        self.absorb_block(&block);
        self.queue = [0u8; RATE];
        self.queued = 0;
    }

    /// Emit `out.len()` bytes, permuting between rate-sized blocks.
    pub fn squeeze(&mut self, out: &mut [u8]) {
        let mut produced = 0;
        while produced < out.len() {
            let mut block = [0u8; RATE];
            self.extract_block(&mut block);
            let take = RATE.min(out.len() - produced);
            out[produced..produced + take].copy_from_slice(&block[..take]);
            produced += take;
            if produced < out.len() {
                self.permute();
            }
        }
    }

    fn absorb_block(&mut self, block: &[u8; RATE]) {
        for (li, chunk) in block.chunks_exact(8).enumerate() {
            self.lanes[li] ^= u64::from_le_bytes(chunk.try_into().unwrap());
        }
        self.permute();
    }

    fn extract_block(&self, block: &mut [u8; RATE]) {
        for (li, chunk) in block.chunks_exact_mut(8).enumerate() {
            chunk.copy_from_slice(&self.lanes[li].to_le_bytes());
        }
    }

    fn permute(&mut self) {
        let a = &mut self.lanes;

        for &rc in RC.iter().take(ROUNDS) {
            // theta
            let mut c = [0u64; 5];
            for x in 0..5 {
                c[x] = a[x] ^ a[x + 5] ^ a[x + 10] ^ a[x + 15] ^ a[x + 20];
            }
            let mut d = [0u64; 5];
            for x in 0..5 {
                d[x] = c[(x + 4) % 5] ^ c[(x + 1) % 5].rotate_left(1);
            }
            for y in 0..5 {
                for x in 0..5 {
                    a[x + 5 * y] ^= d[x];
                }
            }

            // rho + pi: rotate each lane, move (x, y) -> (y, (2x+3y) mod 5)
            let mut b = [0u64; 25];
            for y in 0..5 {
                for x in 0..5 {
                    let xp = y;
                    let yp = (2 * x + 3 * y) % 5;
                    b[xp + 5 * yp] = a[x + 5 * y].rotate_left(RHO[x + 5 * y]);
                }
            }

            // chi
            for y in 0..5 {
                let y5 = 5 * y;
                let (b0, b1, b2, b3, b4) = (b[y5], b[y5 + 1], b[y5 + 2], b[y5 + 3], b[y5 + 4]);
                a[y5] = b0 ^ (!b1 & b2);
                a[y5 + 1] = b1 ^ (!b2 & b3);
                a[y5 + 2] = b2 ^ (!b3 & b4);
                a[y5 + 3] = b3 ^ (!b4 & b0);
                a[y5 + 4] = b4 ^ (!b0 & b1);
            }

            // iota
            a[0] ^= rc;
        }
    }
}

impl Default for SpongeXof {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot XOF over `input` with the SHAKE256 domain byte.
pub fn xof(input: &[u8], out_bytes: usize) -> Vec<u8> {
    let mut x = SpongeXof::new();
    x.absorb(input);
    x.absorb_domain_pad(0x1f);
    let mut out = vec![0u8; out_bytes];
    x.squeeze(&mut out);
    out
}
