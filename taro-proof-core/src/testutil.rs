//! Fixtures shared by unit tests.

extern crate std;

use alloc::collections::BTreeSet;
use alloc::vec;
use alloc::vec::Vec;

use bitcoin::absolute::LockTime;
use bitcoin::block::{Header, Version as BlockVersion};
use bitcoin::hashes::{sha256, Hash};
use bitcoin::key::TapTweak;
use bitcoin::secp256k1::{self, PublicKey as SecpPublicKey, Secp256k1, SecretKey};
use bitcoin::taproot::TapNodeHash;
use bitcoin::transaction::Version;
use bitcoin::{
    Amount, Block, BlockHash, CompactTarget, OutPoint, ScriptBuf, Sequence, Transaction, TxIn,
    TxOut, Txid, Witness,
};
use taro_proof_types::commitment::CommitmentRoot;
use taro_proof_types::key::SerializedKey;
use taro_proof_types::proof::TaprootProof;

use crate::assemble::BaseProofParams;
use crate::key::{derive_output_key, taproot_script_pubkey};
use crate::merkle::MerkleTree;
use crate::{OpsError, TaprootOps};

static INIT_LOGGER: std::sync::Once = std::sync::Once::new();

pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init()
            .ok();
    });
}

/// Secp-backed ops used by unit tests.
pub struct TestOps {
    secp: Secp256k1<secp256k1::VerifyOnly>,
}

impl TestOps {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::verification_only(),
        }
    }
}

impl TaprootOps for TestOps {
    type PubKey = SecpPublicKey;

    fn parse_internal_key(&self, key: &SerializedKey) -> Result<Self::PubKey, OpsError> {
        SecpPublicKey::from_slice(&key.bytes).map_err(|_| OpsError::InvalidInternalKey)
    }

    fn taproot_output_key(
        &self,
        internal_key: &Self::PubKey,
        tapscript_root: Option<[u8; 32]>,
    ) -> Result<SerializedKey, OpsError> {
        let merkle_root = tapscript_root.map(TapNodeHash::from_byte_array);
        let (xonly_key, _) = internal_key.x_only_public_key();
        let (tweaked, parity) = xonly_key.tap_tweak(&self.secp, merkle_root);
        let output_key =
            SecpPublicKey::from_x_only_public_key(tweaked.to_x_only_public_key(), parity);
        Ok(SerializedKey::from(output_key))
    }
}

/// Returns the public key for the secret `[n; 32]`.
pub fn pubkey(n: u8) -> SerializedKey {
    let secp = Secp256k1::new();
    let secret = SecretKey::from_slice(&[n; 32]).unwrap();
    SerializedKey::from(SecpPublicKey::from_secret_key(&secp, &secret))
}

/// Returns a tapscript node derived from a tag.
pub fn node(tag: &[u8]) -> TapNodeHash {
    TapNodeHash::from_byte_array(sha256::Hash::hash(tag).to_byte_array())
}

/// Outpoint spent by every fixture anchor transaction.
pub fn fixture_genesis_point() -> OutPoint {
    OutPoint {
        txid: Txid::from_byte_array([0x11; 32]),
        vout: 1,
    }
}

/// Builds a single-input transaction paying to `scripts`.
pub fn tx_with_outputs(scripts: Vec<ScriptBuf>) -> Transaction {
    Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: fixture_genesis_point(),
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output: scripts
            .into_iter()
            .map(|script_pubkey| TxOut {
                value: Amount::from_sat(1_000),
                script_pubkey,
            })
            .collect(),
    }
}

/// Builds an unrelated transaction; distinct `n` give distinct txids.
pub fn filler_tx(n: u32) -> Transaction {
    Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint {
                txid: Txid::from_byte_array([0xaa; 32]),
                vout: n,
            },
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output: vec![TxOut {
            value: Amount::from_sat(50_000),
            script_pubkey: ScriptBuf::new_op_return(n.to_le_bytes()),
        }],
    }
}

/// Builds a block over `txdata` with a matching header merkle root.
pub fn block_with(txdata: Vec<Transaction>) -> Block {
    let txids: Vec<Txid> = txdata.iter().map(Transaction::compute_txid).collect();
    let merkle_root = MerkleTree::build(&txids).unwrap().root();
    Block {
        header: Header {
            version: BlockVersion::ONE,
            prev_blockhash: BlockHash::all_zeros(),
            merkle_root,
            time: 1_600_000_000,
            bits: CompactTarget::from_consensus(0x207f_ffff),
            nonce: 0,
        },
        txdata,
    }
}

/// An anchor transaction carrying one committed output inside a block.
pub struct Scenario {
    pub ops: TestOps,
    pub commitment: CommitmentRoot,
    pub sibling: Option<TapNodeHash>,
    pub internal_key: SerializedKey,
    pub output_index: u32,
    pub tx: Transaction,
    pub tx_index: usize,
    pub block: Block,
    pub exclusion_proofs: Vec<TaprootProof>,
}

impl Scenario {
    /// Asset at `output_index` among `output_count` outputs; every other
    /// output is BIP-86. The anchor follows `filler` unrelated txs.
    pub fn new(output_index: u32, output_count: u32, filler: u32) -> Self {
        init_logger();
        let ops = TestOps::new();
        let commitment = CommitmentRoot(node(b"taro commitment"));
        let sibling = Some(node(b"tapscript sibling"));
        let internal_key = pubkey(1);

        let mut scripts = Vec::new();
        let mut exclusion_proofs = Vec::new();
        for idx in 0..output_count {
            let script = if idx == output_index {
                let root = taro_proof_types::commitment::tap_branch(commitment.0, sibling.as_ref());
                taproot_script_pubkey(derive_output_key(&ops, &internal_key, Some(root)).unwrap())
            } else {
                let key = pubkey(10 + idx as u8);
                exclusion_proofs.push(TaprootProof::bip86(idx, key));
                taproot_script_pubkey(derive_output_key(&ops, &key, None).unwrap())
            };
            scripts.push(script);
        }

        let tx = tx_with_outputs(scripts);
        let mut txdata: Vec<Transaction> = (0..filler).map(filler_tx).collect();
        txdata.push(tx.clone());
        let block = block_with(txdata);

        Self {
            ops,
            commitment,
            sibling,
            internal_key,
            output_index,
            tx,
            tx_index: filler as usize,
            block,
            exclusion_proofs,
        }
    }

    pub fn params(&self) -> BaseProofParams<'_, CommitmentRoot> {
        BaseProofParams {
            block: &self.block,
            tx: &self.tx,
            tx_index: self.tx_index,
            output_index: self.output_index,
            internal_key: self.internal_key,
            taro_root: &self.commitment,
            tapscript_sibling: self.sibling,
            exclusion_proofs: self.exclusion_proofs.clone(),
        }
    }

    pub fn known_headers(&self) -> BTreeSet<BlockHash> {
        [self.block.block_hash()].into_iter().collect()
    }
}
