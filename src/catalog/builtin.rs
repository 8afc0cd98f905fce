//! Built-in model group table.
//!
//! Every group defaults to disabled; operators opt in per group with
//! `DOWNLOAD_<NAME>=true` or wholesale with `DOWNLOAD_ALL=true`.

use super::{Catalog, GroupDef};

fn group(name: &str, enabled: bool, entries: &[&str]) -> GroupDef {
    GroupDef {
        name: name.to_string(),
        enabled,
        entries: entries.iter().map(|e| e.to_string()).collect(),
    }
}

pub fn catalog() -> Catalog {
    Catalog::new(vec![
        group("SD15", false, &[
            "https://huggingface.co/runwayml/stable-diffusion-v1-5/resolve/main/v1-5-pruned-emaonly.safetensors:checkpoints",
            "https://huggingface.co/stabilityai/sd-vae-ft-mse-original/resolve/main/vae-ft-mse-840000-ema-pruned.safetensors:vae",
        ]),
        group("SDXL", false, &[
            "https://huggingface.co/stabilityai/stable-diffusion-xl-base-1.0/resolve/main/sd_xl_base_1.0.safetensors:checkpoints",
            "https://huggingface.co/stabilityai/stable-diffusion-xl-refiner-1.0/resolve/main/sd_xl_refiner_1.0.safetensors:checkpoints",
            "https://huggingface.co/madebyollin/sdxl-vae-fp16-fix/resolve/main/sdxl_vae.safetensors:vae",
        ]),
        group("FLUX", false, &[
            // flux1-dev is gated; an anonymous run fails this entry and
            // carries on with the rest of the group.
            "https://huggingface.co/black-forest-labs/FLUX.1-dev/resolve/main/flux1-dev.safetensors:diffusion_models",
            "https://huggingface.co/StableDiffusionVN/Flux/resolve/main/Vae/flux_vae.safetensors:vae",
            "https://huggingface.co/comfyanonymous/flux_text_encoders/resolve/main/clip_l.safetensors:clip",
            "https://huggingface.co/comfyanonymous/flux_text_encoders/resolve/main/t5xxl_fp8_e4m3fn.safetensors:clip",
        ]),
        group("CONTROLNET", false, &[
            "https://huggingface.co/xinsir/controlnet-union-sdxl-1.0/resolve/main/diffusion_pytorch_model_promax.safetensors:controlnet",
            "https://huggingface.co/lllyasviel/ControlNet-v1-1/resolve/main/control_v11p_sd15_openpose.pth:controlnet",
        ]),
        group("UPSCALE", false, &[
            "https://huggingface.co/ai-forever/Real-ESRGAN/resolve/main/RealESRGAN_x4.pth:upscale_models",
            "https://huggingface.co/lokCX/4x-Ultrasharp/resolve/main/4x-UltraSharp.pth:upscale_models",
        ]),
    ])
}
