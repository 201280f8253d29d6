use std::{collections::HashMap, path::Path};

use glam::{Mat4, Quat, Vec3};
use gltf::{
    animation::util::ReadOutputs,
    mesh::Mode,
    scene::Transform,
    Document,
};

use crate::{
    error::LoadError,
    game::{
        animation::{AnimationClip, Channel, Interpolation, Track},
        animator::AnimatedModel,
        mesh::{normalize_weights, MeshBuffers, SkinnedVertex},
        skeleton::{Bone, Skeleton, TRS},
    },
};

pub fn transform_to_mat4(transform: Transform) -> Mat4 {
    match transform {
        Transform::Matrix { matrix } => Mat4::from_cols_array_2d(&matrix),
        Transform::Decomposed {
            translation,
            rotation,
            scale,
        } => Mat4::from_scale_rotation_translation(
            Vec3::from(scale),
            Quat::from_array(rotation),
            Vec3::from(translation),
        ),
    }
}

fn transform_to_trs(transform: Transform) -> TRS {
    let (t, r, s) = transform.decomposed();
    TRS {
        t: Vec3::from(t),
        r: Quat::from_array(r),
        s: Vec3::from(s),
    }
}

/// Loads a `.gltf` / `.glb` file into an [`AnimatedModel`]. Either everything loads or nothing does.
pub fn load(path: impl AsRef<Path>) -> Result<AnimatedModel, LoadError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(LoadError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "model file not found"),
        });
    }
    let gltf::Gltf { document, blob, .. } = gltf::Gltf::open(path)?;
    // images are never decoded, only geometry and animation are read
    let buffers = gltf::import_buffers(&document, path.parent(), blob)?;
    let model = from_document(&document, &buffers)?;
    log::info!(
        "loaded {}: {} bones, {} clips, {} vertices",
        path.display(),
        model.skeleton().bone_count(),
        model.clip_count(),
        model.mesh().vertices.len()
    );
    Ok(model)
}

pub fn from_document(document: &Document, buffers: &[gltf::buffer::Data]) -> Result<AnimatedModel, LoadError> {
    let skin = document.skins().next().ok_or(LoadError::NoSkin)?;
    if document.skins().len() > 1 {
        log::warn!("only the first of {} skins is used", document.skins().len());
    }

    let skeleton = read_skeleton(document, &skin, buffers)?;
    let joint_of_node: HashMap<usize, usize> = skin
        .joints()
        .enumerate()
        .map(|(bone, node)| (node.index(), bone))
        .collect();
    let clips = document
        .animations()
        .enumerate()
        .map(|(idx, animation)| read_clip(idx, &animation, &joint_of_node, buffers))
        .collect::<Result<Vec<_>, _>>()?;
    let mesh = read_mesh(document, &skin, buffers)?;

    AnimatedModel::new(skeleton, clips, mesh)
}

fn node_parents(document: &Document) -> Vec<Option<usize>> {
    let mut parents = vec![None; document.nodes().len()];
    for node in document.nodes() {
        for child in node.children() {
            parents[child.index()] = Some(node.index());
        }
    }
    parents
}

fn read_skeleton(document: &Document, skin: &gltf::Skin, buffers: &[gltf::buffer::Data]) -> Result<Skeleton, LoadError> {
    let nodes: Vec<gltf::Node> = document.nodes().collect();
    let parents = node_parents(document);
    let joints: Vec<gltf::Node> = skin.joints().collect();
    let joint_of_node: HashMap<usize, usize> = joints
        .iter()
        .enumerate()
        .map(|(bone, node)| (node.index(), bone))
        .collect();

    let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));
    let inverse_binds: Vec<Mat4> = match reader.read_inverse_bind_matrices() {
        Some(matrices) => matrices.map(|m| Mat4::from_cols_array_2d(&m)).collect(),
        None => vec![Mat4::IDENTITY; joints.len()],
    };
    if inverse_binds.len() != joints.len() {
        return Err(LoadError::InverseBindCountMismatch {
            matrices: inverse_binds.len(),
            joints: joints.len(),
        });
    }

    let mut bones = Vec::with_capacity(joints.len());
    for (bone, (node, inverse_bind_matrix)) in joints.iter().zip(inverse_binds).enumerate() {
        // climb to the nearest joint ancestor, folding any plain nodes in between
        let mut parent = None;
        let mut offset = Mat4::IDENTITY;
        let mut cur = parents[node.index()];
        let mut steps = 0;
        while let Some(ancestor) = cur {
            if let Some(&joint) = joint_of_node.get(&ancestor) {
                parent = Some(joint);
                break;
            }
            steps += 1;
            if steps > nodes.len() {
                return Err(LoadError::CyclicHierarchy { bone });
            }
            offset = transform_to_mat4(nodes[ancestor].transform()) * offset;
            cur = parents[ancestor];
        }

        bones.push(Bone {
            name: node.name().map(str::to_string),
            parent,
            inverse_bind_matrix,
            rest: transform_to_trs(node.transform()),
            offset,
        });
    }

    Skeleton::new(bones)
}

fn read_clip(
    idx: usize,
    animation: &gltf::Animation,
    joint_of_node: &HashMap<usize, usize>,
    buffers: &[gltf::buffer::Data],
) -> Result<AnimationClip, LoadError> {
    let name = animation
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("animation_{idx}"));
    let mut tracks: HashMap<usize, Track> = HashMap::new();

    for channel in animation.channels() {
        let node = channel.target().node();
        let Some(&bone) = joint_of_node.get(&node.index()) else {
            log::warn!(
                "clip '{}': skipping channel on node {} which is not a joint",
                name,
                node.index()
            );
            continue;
        };
        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Linear => Interpolation::Linear,
            gltf::animation::Interpolation::Step => Interpolation::Step,
            gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
        };

        let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));
        let times: Vec<f32> = reader
            .read_inputs()
            .ok_or_else(|| LoadError::Unsupported(format!("clip '{name}': channel without keyframe times")))?
            .collect();
        match reader.read_outputs() {
            Some(ReadOutputs::Translations(values)) => {
                let channel = Channel::new(times, values.map(Vec3::from).collect(), interpolation)?;
                tracks.entry(bone).or_insert_with(|| Track::new(bone)).translation = Some(channel);
            }
            Some(ReadOutputs::Rotations(values)) => {
                let channel = Channel::new(times, values.into_f32().map(Quat::from_array).collect(), interpolation)?;
                tracks.entry(bone).or_insert_with(|| Track::new(bone)).rotation = Some(channel);
            }
            Some(ReadOutputs::Scales(values)) => {
                let channel = Channel::new(times, values.map(Vec3::from).collect(), interpolation)?;
                tracks.entry(bone).or_insert_with(|| Track::new(bone)).scale = Some(channel);
            }
            Some(ReadOutputs::MorphTargetWeights(_)) => {
                log::warn!("clip '{}': morph target weights are not supported, skipping", name);
            }
            None => {
                return Err(LoadError::Unsupported(format!(
                    "clip '{name}': channel without keyframe values"
                )))
            }
        }
    }

    let duration = tracks.values().map(Track::end_time).fold(0.0, f32::max);
    log::debug!("clip '{}': {} animated bones, {:.3}s", name, tracks.len(), duration);
    AnimationClip::new(name, duration, tracks.into_values().collect())
}

/// Merges every primitive of every mesh node bound to `skin` into one buffer.
fn read_mesh(document: &Document, skin: &gltf::Skin, buffers: &[gltf::buffer::Data]) -> Result<MeshBuffers, LoadError> {
    let mut mesh_buffers = MeshBuffers::default();

    for node in document.nodes() {
        let Some(mesh) = node.mesh() else {
            continue;
        };
        if node.skin().map(|s| s.index()) != Some(skin.index()) {
            log::warn!("skipping mesh {} on node {} which is not bound to the skeleton", mesh.index(), node.index());
            continue;
        }

        for primitive in mesh.primitives() {
            if primitive.mode() != Mode::Triangles {
                return Err(LoadError::Unsupported(format!(
                    "mesh {} primitive {}: {:?} topology",
                    mesh.index(),
                    primitive.index(),
                    primitive.mode()
                )));
            }
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

            // document validation already requires POSITION on every primitive
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let count = positions.len();
            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|normals| normals.collect())
                .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; count]);
            let joints: Vec<[u16; 4]> = reader
                .read_joints(0)
                .map(|joints| joints.into_u16().collect())
                .unwrap_or_else(|| vec![[0; 4]; count]);
            let weights: Vec<[f32; 4]> = reader
                .read_weights(0)
                .map(|weights| weights.into_f32().collect())
                .unwrap_or_else(|| vec![[1.0, 0.0, 0.0, 0.0]; count]);
            if normals.len() != count || joints.len() != count || weights.len() != count {
                return Err(LoadError::Unsupported(format!(
                    "mesh {} primitive {}: attribute counts differ",
                    mesh.index(),
                    primitive.index()
                )));
            }
            let indices: Vec<u32> = reader
                .read_indices()
                .map(|indices| indices.into_u32().collect())
                .unwrap_or_else(|| (0..count as u32).collect());

            let color = primitive.material().pbr_metallic_roughness().base_color_factor();
            let vertices = (0..count)
                .map(|i| SkinnedVertex {
                    position: positions[i],
                    normal: normals[i],
                    color,
                    joints: joints[i].map(u32::from),
                    weights: normalize_weights(weights[i]),
                })
                .collect();
            mesh_buffers.append(vertices, indices);
        }
    }

    if mesh_buffers.is_empty() {
        log::warn!("no geometry is bound to the skeleton, only the pose will be evaluated");
    }
    Ok(mesh_buffers)
}
